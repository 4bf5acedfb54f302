//! Bundle of optional external backends plugged into the service.

use std::sync::Arc;

use crate::ports::{AnnotationPort, CenterPort};

/// External backends available to the service. Missing ones trigger local fallbacks.
#[derive(Clone, Default)]
pub struct Backends {
    /// Label/object detection backend.
    pub annotations: Option<Arc<dyn AnnotationPort>>,
    /// Recycling center search backend.
    pub centers: Option<Arc<dyn CenterPort>>,
}

impl Backends {
    /// No external backends at all.
    #[must_use]
    pub fn offline() -> Self {
        Self::default()
    }

    /// Use `port` for image annotation.
    #[must_use]
    pub fn with_annotations(mut self, port: Arc<dyn AnnotationPort>) -> Self {
        self.annotations = Some(port);
        self
    }

    /// Use `port` for center search.
    #[must_use]
    pub fn with_centers(mut self, port: Arc<dyn CenterPort>) -> Self {
        self.centers = Some(port);
        self
    }

    /// Names of the configured backends, for logging.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        let annotations = self.annotations.as_deref().map(|port| port.name().to_owned());
        let centers = self.centers.as_deref().map(|port| port.name().to_owned());
        annotations.into_iter().chain(centers).collect()
    }
}
