//! Traits describing external service capabilities and shared helper types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{GeoPoint, LabelAnnotation, RecyclingCenter, WasteCategory};

/// Labels requested from the annotation service per image.
pub const MAX_LABELS: usize = 10;
/// Localized objects requested in the secondary pass.
pub const MAX_OBJECTS: usize = 5;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to external services.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Service answered with a non-success HTTP status.
    #[error("Unexpected status: {0}")]
    Status(u16),
    /// Service reported an error inside an otherwise successful response.
    #[error("Service error: {0}")]
    Api(String),
    /// No API key configured.
    #[error("Missing API credentials")]
    MissingCredentials,
    /// The call did not finish within the configured timeout.
    #[error("Request timed out")]
    Timeout,
    /// Response could not be interpreted.
    #[error("Decode error: {0}")]
    Decode(String),
}

#[async_trait]
/// Trait for label/object detection backends.
pub trait AnnotationPort: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Detect up to [`MAX_LABELS`] labels in the image.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the service cannot be reached or rejects the request.
    async fn labels(&self, image: &[u8]) -> Result<Vec<LabelAnnotation>, PortError>;

    /// Detect up to [`MAX_OBJECTS`] localized objects in the image.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the service cannot be reached or rejects the request.
    async fn objects(&self, image: &[u8]) -> Result<Vec<LabelAnnotation>, PortError>;
}

#[async_trait]
/// Trait for place-search backends that know about recycling centers.
pub trait CenterPort: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Find centers around `origin` within `radius_km`, optionally tailored to a category.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn nearby(
        &self,
        origin: GeoPoint,
        radius_km: f64,
        category: Option<WasteCategory>,
    ) -> Result<Vec<RecyclingCenter>, PortError>;
}
