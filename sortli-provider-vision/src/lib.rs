//! Annotation backend using the Google Cloud Vision `images:annotate` endpoint.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sortli_core::{
    model::LabelAnnotation,
    ports::{AnnotationPort, MAX_LABELS, MAX_OBJECTS, PortError},
};

const BASE_URL: &str = "https://vision.googleapis.com";

/// Body of POST /v1/images:annotate
#[derive(Debug, Serialize)]
struct AnnotateRequest<'payload> {
    requests: [ImageRequest<'payload>; 1],
}

#[derive(Debug, Serialize)]
struct ImageRequest<'payload> {
    image: ImageContent,
    features: [Feature<'payload>; 1],
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature<'payload> {
    #[serde(rename = "type")]
    kind: &'payload str,
    max_results: usize,
}

/// Response of POST /v1/images:annotate
#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

/// One entry per image sent; we always send exactly one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<LocalizedObject>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    description: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct LocalizedObject {
    name: String,
    #[serde(default)]
    score: f64,
    // boundingPoly is ignored, only the name matters for classification
}

/// google.rpc.Status embedded in a per-image response
#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

/// Label and object detection via Cloud Vision.
pub struct VisionAnnotationPort {
    client: Client,
    api_key: String,
    base_url: String,
}

impl VisionAnnotationPort {
    /// Create a port bound to the given HTTP client and API key.
    #[must_use]
    pub fn new<K: Into<String>>(client: Client, api_key: K) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_owned(),
        }
    }

    /// Point the port at a different host, e.g. an emulator.
    #[must_use]
    pub fn with_base_url<U: Into<String>>(mut self, base_url: U) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn annotate(
        &self,
        image: &[u8],
        feature: &str,
        max_results: usize,
    ) -> Result<ImageResponse, PortError> {
        if self.api_key.trim().is_empty() {
            return Err(PortError::MissingCredentials);
        }

        let body = AnnotateRequest {
            requests: [ImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: [Feature {
                    kind: feature,
                    max_results,
                }],
            }],
        };

        let req = self
            .client
            .post(format!("{}/v1/images:annotate", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&body);

        let response = fetch_json::<AnnotateResponse>(req).await?;
        first_response(response)
    }
}

#[async_trait]
impl AnnotationPort for VisionAnnotationPort {
    fn name(&self) -> &str {
        "google-vision"
    }

    async fn labels(&self, image: &[u8]) -> Result<Vec<LabelAnnotation>, PortError> {
        let response = self.annotate(image, "LABEL_DETECTION", MAX_LABELS).await?;
        let labels: Vec<LabelAnnotation> = response
            .label_annotations
            .into_iter()
            .take(MAX_LABELS)
            .map(|label| LabelAnnotation::new(label.description, label.score))
            .collect();
        debug!(?labels, "Vision labels");
        Ok(labels)
    }

    async fn objects(&self, image: &[u8]) -> Result<Vec<LabelAnnotation>, PortError> {
        let response = self
            .annotate(image, "OBJECT_LOCALIZATION", MAX_OBJECTS)
            .await?;
        let objects: Vec<LabelAnnotation> = response
            .localized_object_annotations
            .into_iter()
            .take(MAX_OBJECTS)
            .map(|object| LabelAnnotation::new(object.name, object.score))
            .collect();
        debug!(?objects, "Vision objects");
        Ok(objects)
    }
}

fn first_response(response: AnnotateResponse) -> Result<ImageResponse, PortError> {
    let image = response
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| PortError::Decode("empty responses array".to_owned()))?;

    match image.error {
        Some(status) => Err(PortError::Api(status.message)),
        None => Ok(image),
    }
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
