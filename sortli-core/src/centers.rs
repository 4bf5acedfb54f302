//! Distance math and filtering for recycling center lookups.

use crate::model::{GeoPoint, NearbyCenter, RecyclingCenter, WasteCategory, round2};

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers.
#[must_use]
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let (lat1, lat2) = (from.lat.to_radians(), to.lat.to_radians());
    let delta_lat = lat2 - lat1;
    let delta_lng = (to.lng - from.lng).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    2.0 * half_chord.sqrt().asin() * EARTH_RADIUS_KM
}

/// Search phrase for a place-search backend.
#[must_use]
pub fn search_keyword(category: Option<WasteCategory>) -> &'static str {
    match category {
        Some(WasteCategory::Electronic) => "electronic waste recycling",
        Some(WasteCategory::Hazardous) => "hazardous waste disposal",
        _ => "recycling center",
    }
}

/// Annotate centers with their distance, drop those that don't take `category` or lie
/// outside `radius_km` (when given), and sort nearest first.
#[must_use]
pub fn rank(
    centers: Vec<RecyclingCenter>,
    origin: GeoPoint,
    radius_km: Option<f64>,
    category: Option<WasteCategory>,
) -> Vec<NearbyCenter> {
    let mut nearby: Vec<NearbyCenter> = centers
        .into_iter()
        .filter(|center| category.is_none_or(|wanted| center.accepts(wanted)))
        .map(|center| NearbyCenter {
            distance_km: round2(haversine_km(origin, center.location)),
            center,
        })
        .filter(|nearby| radius_km.is_none_or(|radius| nearby.distance_km <= radius))
        .collect();

    nearby.sort_by(|left, right| left.distance_km.total_cmp(&right.distance_km));
    nearby
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center(name: &str, lat: f64, lng: f64, accepted: Vec<WasteCategory>) -> RecyclingCenter {
        RecyclingCenter {
            name: name.to_owned(),
            address: String::new(),
            location: GeoPoint::new(lat, lng),
            accepted,
            hours: None,
            rating: None,
            open_now: None,
        }
    }

    #[test]
    fn haversine_basics() {
        let cologne = GeoPoint::new(50.9375, 6.9603);
        assert!(haversine_km(cologne, cologne).abs() < 1e-9);

        let one_degree = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((one_degree - 111.19).abs() < 0.01, "got {one_degree}");

        let aachen = GeoPoint::new(50.7753, 6.0839);
        let there = haversine_km(cologne, aachen);
        let back = haversine_km(aachen, cologne);
        assert!((there - back).abs() < 1e-9);
        assert!((60.0..70.0).contains(&there), "got {there}");
    }

    #[test]
    fn keyword_depends_on_category() {
        assert_eq!(
            search_keyword(Some(WasteCategory::Electronic)),
            "electronic waste recycling"
        );
        assert_eq!(
            search_keyword(Some(WasteCategory::Hazardous)),
            "hazardous waste disposal"
        );
        assert_eq!(search_keyword(Some(WasteCategory::Glass)), "recycling center");
        assert_eq!(search_keyword(None), "recycling center");
    }

    #[test]
    fn rank_filters_and_sorts() {
        let origin = GeoPoint::new(50.0, 8.0);
        let centers = vec![
            center("far", 50.2, 8.0, Vec::new()),
            center("near", 50.01, 8.0, vec![WasteCategory::Glass]),
            center("mid", 50.05, 8.0, Vec::new()),
            center("wrong kind", 50.001, 8.0, vec![WasteCategory::Electronic]),
        ];

        let ranked = rank(centers, origin, Some(10.0), Some(WasteCategory::Glass));
        let names: Vec<&str> = ranked.iter().map(|item| item.center.name.as_str()).collect();
        assert_eq!(names, ["near", "mid"]);
        assert!(ranked.windows(2).all(|pair| match pair {
            [first, second] => first.distance_km <= second.distance_km,
            _ => true,
        }));
    }
}
