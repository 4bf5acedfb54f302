//! Carbon impact of disposal events and footprint summaries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::model::{CarbonImpact, Disposal, DisposalRecord, WasteCategory, round2};

/// Share of emissions avoided when recyclable waste is sorted correctly.
pub const AVOIDED_SHARE: f64 = 0.7;
/// Share of emissions left when non-recyclable waste is disposed of correctly.
pub const RESIDUAL_SHARE: f64 = 0.3;
/// kg CO2 one tree absorbs per year.
pub const TREE_KG_PER_YEAR: f64 = 21.0;
/// kg CO2 emitted per km driven by an average car.
pub const CAR_KG_PER_KM: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Formula used to turn weight into carbon impact. Negative results are always savings.
pub enum CarbonModel {
    /// Recyclable and proper: `-(w * f * 0.7)`. Proper but not recyclable: `w * f * 0.3`.
    /// Improper: `w * f`.
    #[default]
    AvoidedEmissions,
    /// Recyclable and proper: `-(w * f)`. Anything else: `0`.
    Savings,
}

/// Computes carbon impact from the catalog's per-category factors.
#[derive(Debug, Clone)]
pub struct CarbonEstimator {
    catalog: Arc<Catalog>,
    model: CarbonModel,
}

impl CarbonEstimator {
    /// Create an estimator using the given model for every call.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, model: CarbonModel) -> Self {
        Self { catalog, model }
    }

    /// Model used by this estimator.
    #[must_use]
    pub fn model(&self) -> CarbonModel {
        self.model
    }

    /// Impact of properly disposing `weight_kg` of `category`.
    #[must_use]
    pub fn estimate(&self, category: WasteCategory, weight_kg: f64) -> CarbonImpact {
        self.estimate_disposal(category, weight_kg, Disposal::Proper)
    }

    /// Impact of disposing `weight_kg` of `category` the given way.
    ///
    /// Negative, NaN, and infinite weights count as zero.
    #[must_use]
    pub fn estimate_disposal(
        &self,
        category: WasteCategory,
        weight_kg: f64,
        disposal: Disposal,
    ) -> CarbonImpact {
        let weight = if weight_kg.is_finite() { weight_kg.max(0.0) } else { 0.0 };
        let profile = self.catalog.profile(category);
        let base = weight * profile.carbon_factor;

        let impact = match (self.model, disposal, profile.recyclable) {
            (CarbonModel::AvoidedEmissions, Disposal::Proper, true) => -(base * AVOIDED_SHARE),
            (CarbonModel::AvoidedEmissions, Disposal::Proper, false) => base * RESIDUAL_SHARE,
            (CarbonModel::AvoidedEmissions, Disposal::Improper, _) => base,
            (CarbonModel::Savings, Disposal::Proper, true) => -base,
            (CarbonModel::Savings, _, _) => 0.0,
        };

        CarbonImpact::from_kg(impact)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Totals over a set of disposal records.
pub struct Footprint {
    /// Sum of positive impacts.
    pub total_emissions: f64,
    /// Sum of avoided emissions, as a positive number.
    pub total_savings: f64,
    /// Emissions minus savings.
    pub net_impact: f64,
    /// Trees needed for a year to absorb the saved CO2.
    pub trees_equivalent: f64,
    /// Car kilometers matching the saved CO2.
    pub car_km_equivalent: f64,
}

/// Summarize the carbon impact of `records`.
#[must_use]
pub fn footprint<'record, I>(records: I) -> Footprint
where
    I: IntoIterator<Item = &'record DisposalRecord>,
{
    let (emissions, savings) = records.into_iter().map(|record| record.carbon.kg_co2e()).fold(
        (0.0, 0.0),
        |(emissions, savings), impact| {
            if impact < 0.0 {
                (emissions, savings - impact)
            } else {
                (emissions + impact, savings)
            }
        },
    );

    Footprint {
        total_emissions: round2(emissions),
        total_savings: round2(savings),
        net_impact: round2(emissions - savings),
        trees_equivalent: round2(savings / TREE_KG_PER_YEAR),
        car_km_equivalent: round2(savings / CAR_KG_PER_KM),
    }
}
