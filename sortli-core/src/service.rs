//! High-level service facade combining classification, carbon scoring, rewards, and
//! center lookup.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::carbon::{CarbonEstimator, CarbonModel, Footprint, footprint};
use crate::catalog::{Catalog, CategoryProfile};
use crate::centers::rank;
use crate::classify::{Classification, Classifier};
use crate::config::Settings;
use crate::model::{
    Badge, CarbonImpact, ClassificationResult, Disposal, DisposalRecord, GeoPoint, NearbyCenter,
    RecyclingCenter, WasteCategory,
};
use crate::plugin::Backends;
use crate::ports::PortError;
use crate::rewards::{Profile, ProfileStats, points_for, standard_badges};

#[derive(Debug, Clone)]
/// What the user hands in for classification.
pub enum WasteInput {
    /// Photo of the item, in any format the `image` crate decodes.
    Image(Vec<u8>),
    /// Category chosen by hand.
    Manual(WasteCategory),
}

#[derive(Debug, Clone)]
/// Tunables for the service, usually derived from [`Settings`].
pub struct ServiceOptions {
    /// Upper bound per annotation call.
    pub request_timeout: Duration,
    /// Ask for localized objects when labels are inconclusive.
    pub object_pass: bool,
    /// Carbon formula.
    pub carbon_model: CarbonModel,
    /// Centers used when no places backend answers.
    pub local_centers: Vec<RecyclingCenter>,
    /// Badge ladder.
    pub badges: Vec<Badge>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ServiceOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            request_timeout: settings.request_timeout(),
            object_pass: settings.object_pass,
            carbon_model: settings.carbon_model,
            local_centers: settings.centers.clone(),
            badges: standard_badges(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// A disposal the user wants to log.
pub struct DisposalEntry {
    /// Classified or chosen category with its confidence.
    pub result: ClassificationResult,
    /// Weight in kilograms.
    pub weight_kg: f64,
    /// How it was disposed of.
    pub disposal: Disposal,
    /// Where it happened.
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// What logging a disposal produced.
pub struct DisposalReceipt {
    /// The stored record.
    pub record: DisposalRecord,
    /// Whether the category is recyclable.
    pub recyclable: bool,
    /// Badges unlocked by this disposal.
    pub new_badges: Vec<Badge>,
    /// Points after the disposal.
    pub total_points: u32,
    /// Carbon balance after the disposal.
    pub carbon_balance: f64,
}

/// Public entry point for classifying waste and tracking progress.
pub struct SortliService {
    catalog: Arc<Catalog>,
    classifier: Classifier,
    estimator: CarbonEstimator,
    backends: Backends,
    options: ServiceOptions,
}

impl SortliService {
    /// Create a new service bound to the catalog and backends.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, backends: Backends, options: ServiceOptions) -> Self {
        let classifier = Classifier::new(
            Arc::clone(&catalog),
            backends.annotations.clone(),
            options.request_timeout,
            options.object_pass,
        );
        let estimator = CarbonEstimator::new(Arc::clone(&catalog), options.carbon_model);
        info!(
            backends = ?backends.describe(),
            model = ?options.carbon_model,
            "Sortli service ready"
        );

        Self {
            catalog,
            classifier,
            estimator,
            backends,
            options,
        }
    }

    /// Category profiles in catalog order.
    pub fn categories(&self) -> impl Iterator<Item = &CategoryProfile> {
        self.catalog.profiles()
    }

    /// Disposal tips for a category.
    #[must_use]
    pub fn tips(&self, category: WasteCategory) -> &[String] {
        &self.catalog.profile(category).tips
    }

    /// Classify a photo or accept a manual choice. Never fails.
    pub async fn classify(&self, input: WasteInput) -> Classification {
        match input {
            WasteInput::Manual(category) => {
                Classification::Manual(ClassificationResult::new(category, 1.0))
            }
            WasteInput::Image(bytes) => self.classifier.classify(&bytes).await,
        }
    }

    /// Carbon impact of properly disposing `weight_kg` of `category`.
    #[must_use]
    pub fn estimate_carbon(&self, category: WasteCategory, weight_kg: f64) -> CarbonImpact {
        self.estimator.estimate(category, weight_kg)
    }

    /// Score a disposal, store it on `profile`, and award points and badges.
    pub fn log_disposal(&self, profile: &mut Profile, entry: DisposalEntry) -> DisposalReceipt {
        let category = entry.result.category;
        let recyclable = self.catalog.is_recyclable(category);
        let weight_kg = if entry.weight_kg.is_finite() {
            entry.weight_kg.max(0.0)
        } else {
            0.0
        };

        let record = DisposalRecord {
            category,
            weight_kg,
            disposal: entry.disposal,
            recorded_at: Utc::now(),
            location: entry.location,
            confidence: entry.result.confidence,
            points_earned: points_for(entry.disposal, recyclable),
            carbon: self
                .estimator
                .estimate_disposal(category, weight_kg, entry.disposal),
        };

        let new_badges = profile.apply(record.clone(), &self.options.badges);
        info!(
            "Logged {weight_kg} kg of {category} for {}: +{} points, {}",
            profile.name, record.points_earned, record.carbon
        );
        for badge in &new_badges {
            info!("{} earned badge {}", profile.name, badge.name);
        }

        DisposalReceipt {
            record,
            recyclable,
            new_badges,
            total_points: profile.points,
            carbon_balance: profile.carbon_balance,
        }
    }

    /// Aggregate statistics for a profile.
    #[must_use]
    pub fn stats(&self, profile: &Profile) -> ProfileStats {
        profile.stats(&self.catalog)
    }

    /// Carbon footprint summary for a profile.
    #[must_use]
    pub fn footprint(&self, profile: &Profile) -> Footprint {
        footprint(&profile.records)
    }

    /// Recycling centers near `origin`, nearest first. Never fails: when the places backend
    /// is missing or errors, the configured local directory is searched instead.
    pub async fn nearby_centers(
        &self,
        origin: GeoPoint,
        radius_km: f64,
        category: Option<WasteCategory>,
    ) -> Vec<NearbyCenter> {
        match self.remote_centers(origin, radius_km, category).await {
            Ok(centers) => rank(centers, origin, None, category),
            Err(err) => {
                warn!("Using local center directory: {err}");
                rank(
                    self.options.local_centers.clone(),
                    origin,
                    Some(radius_km),
                    category,
                )
            }
        }
    }

    async fn remote_centers(
        &self,
        origin: GeoPoint,
        radius_km: f64,
        category: Option<WasteCategory>,
    ) -> Result<Vec<RecyclingCenter>, PortError> {
        let port = self
            .backends
            .centers
            .as_deref()
            .ok_or(PortError::MissingCredentials)?;

        tokio::time::timeout(
            self.options.request_timeout,
            port.nearby(origin, radius_km, category),
        )
        .await
        .unwrap_or(Err(PortError::Timeout))
    }
}
