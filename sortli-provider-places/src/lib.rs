//! Recycling center backend using the Google Places nearby search API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use sortli_core::{
    centers::search_keyword,
    model::{GeoPoint, RecyclingCenter, WasteCategory},
    ports::{CenterPort, PortError},
};

const BASE_URL: &str = "https://maps.googleapis.com";

/// Places API caps the nearby search radius at 50 km.
const MAX_RADIUS_M: f64 = 50_000.0;

/// Response from /maps/api/place/nearbysearch/json
#[derive(Debug, Deserialize)]
struct NearbyResponse {
    status: String,
    #[serde(default)]
    results: Vec<Place>,
    error_message: Option<String>,
}

/// Single place from the nearby search
#[derive(Debug, Deserialize)]
struct Place {
    name: String,
    #[serde(default)]
    vicinity: String,
    geometry: Geometry,
    rating: Option<f64>,
    opening_hours: Option<OpeningHours>,
    // place_id, types, photos etc. exist but we don't need them
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    open_now: Option<bool>,
}

/// Nearby recycling center search via Google Places.
pub struct PlacesCenterPort {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PlacesCenterPort {
    /// Create a port bound to the given HTTP client and API key.
    #[must_use]
    pub fn new<K: Into<String>>(client: Client, api_key: K) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_owned(),
        }
    }

    /// Point the port at a different host.
    #[must_use]
    pub fn with_base_url<U: Into<String>>(mut self, base_url: U) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl CenterPort for PlacesCenterPort {
    fn name(&self) -> &str {
        "google-places"
    }

    async fn nearby(
        &self,
        origin: GeoPoint,
        radius_km: f64,
        category: Option<WasteCategory>,
    ) -> Result<Vec<RecyclingCenter>, PortError> {
        if self.api_key.trim().is_empty() {
            return Err(PortError::MissingCredentials);
        }

        let location = format!("{},{}", origin.lat, origin.lng);
        let radius = format!("{:.0}", (radius_km * 1000.0).clamp(1.0, MAX_RADIUS_M));
        let keyword = search_keyword(category);

        let req = self
            .client
            .get(format!("{}/maps/api/place/nearbysearch/json", self.base_url))
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("keyword", keyword),
                ("key", self.api_key.as_str()),
            ]);

        let resp = fetch_json::<NearbyResponse>(req).await?;
        let centers = into_centers(resp)?;
        debug!(count = centers.len(), keyword, "Places nearby search");
        Ok(centers)
    }
}

fn into_centers(resp: NearbyResponse) -> Result<Vec<RecyclingCenter>, PortError> {
    match resp.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(Vec::new()),
        other => {
            let detail = resp.error_message.unwrap_or_default();
            return Err(PortError::Api(format!("{other} {detail}").trim().to_owned()));
        }
    }

    Ok(resp
        .results
        .into_iter()
        .map(|place| RecyclingCenter {
            name: place.name,
            address: place.vicinity,
            location: GeoPoint::new(place.geometry.location.lat, place.geometry.location.lng),
            // Places does not say which fractions a site takes
            accepted: Vec::new(),
            hours: None,
            rating: place.rating,
            open_now: place.opening_hours.and_then(|hours| hours.open_now),
        })
        .collect())
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let resp = req.send().await.map_err(PortError::from)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(PortError::Status(status.as_u16()));
    }

    resp.json().await.map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<RecyclingCenter>, PortError> {
        into_centers(serde_json::from_str(json).expect("valid json"))
    }

    #[test]
    fn maps_places_to_centers() {
        let centers = parse(
            r#"{
                "status": "OK",
                "results": [{
                    "place_id": "abc",
                    "name": "AWB Wertstoffcenter",
                    "vicinity": "Maarweg 271, Köln",
                    "geometry": { "location": { "lat": 50.93, "lng": 6.91 } },
                    "rating": 4.2,
                    "opening_hours": { "open_now": true },
                    "types": ["point_of_interest"]
                }]
            }"#,
        )
        .expect("ok status");

        let center = centers.first().expect("one center");
        assert_eq!(center.name, "AWB Wertstoffcenter");
        assert_eq!(center.address, "Maarweg 271, Köln");
        assert!((center.location.lat - 50.93).abs() < f64::EPSILON);
        assert_eq!(center.open_now, Some(true));
        assert!(center.accepted.is_empty());
    }

    #[test]
    fn zero_results_is_empty_not_an_error() {
        let centers = parse(r#"{"status":"ZERO_RESULTS","results":[]}"#).expect("empty");
        assert!(centers.is_empty());
    }

    #[test]
    fn denied_request_is_an_error() {
        let err = parse(
            r#"{"status":"REQUEST_DENIED","results":[],"error_message":"The provided API key is invalid."}"#,
        )
        .unwrap_err();
        assert!(
            matches!(&err, PortError::Api(message) if message.starts_with("REQUEST_DENIED")),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn blank_key_is_rejected_before_any_request() {
        let port = PlacesCenterPort::new(Client::new(), "");
        let result = port.nearby(GeoPoint::new(0.0, 0.0), 5.0, None).await;
        assert!(matches!(result, Err(PortError::MissingCredentials)));
    }
}
