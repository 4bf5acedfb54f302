//! Domain data structures for waste categories, classifications, and disposal records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Waste categories known to sortli.
pub enum WasteCategory {
    /// Bottles, containers, packaging.
    Plastic,
    /// Newspapers, magazines, cardboard.
    Paper,
    /// Bottles, jars, containers.
    Glass,
    /// Cans, foil, scrap metal.
    Metal,
    /// Food and garden waste.
    Organic,
    /// Devices, cables, chargers.
    Electronic,
    /// Chemicals, batteries, medicine.
    Hazardous,
    /// General waste headed for landfill.
    NonRecyclable,
}

impl WasteCategory {
    /// All categories in catalog order.
    pub const ALL: [WasteCategory; 8] = [
        WasteCategory::Plastic,
        WasteCategory::Paper,
        WasteCategory::Glass,
        WasteCategory::Metal,
        WasteCategory::Organic,
        WasteCategory::Electronic,
        WasteCategory::Hazardous,
        WasteCategory::NonRecyclable,
    ];

    /// Stable lowercase slug, also accepted by [`FromStr`].
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            WasteCategory::Plastic => "plastic",
            WasteCategory::Paper => "paper",
            WasteCategory::Glass => "glass",
            WasteCategory::Metal => "metal",
            WasteCategory::Organic => "organic",
            WasteCategory::Electronic => "electronic",
            WasteCategory::Hazardous => "hazardous",
            WasteCategory::NonRecyclable => "non-recyclable",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WasteCategory::Plastic => "Plastic",
            WasteCategory::Paper => "Paper",
            WasteCategory::Glass => "Glass",
            WasteCategory::Metal => "Metal",
            WasteCategory::Organic => "Organic",
            WasteCategory::Electronic => "Electronic",
            WasteCategory::Hazardous => "Hazardous",
            WasteCategory::NonRecyclable => "Non-recyclable",
        };
        write!(formatter, "{name}")
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Raised when a free-form category name matches no known category.
#[error("Unknown waste category: {0}")]
pub struct CategoryParseError(pub String);

impl FromStr for WasteCategory {
    type Err = CategoryParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase().replace('_', "-");

        let category = match normalized.as_str() {
            "plastic" => WasteCategory::Plastic,
            "paper" => WasteCategory::Paper,
            "glass" => WasteCategory::Glass,
            "metal" => WasteCategory::Metal,
            "organic" => WasteCategory::Organic,
            "electronic" | "e-waste" => WasteCategory::Electronic,
            "hazardous" => WasteCategory::Hazardous,
            "non-recyclable" | "nonrecyclable" | "landfill" | "general waste"
            | "general-waste" => WasteCategory::NonRecyclable,
            _ => return Err(CategoryParseError(raw.to_owned())),
        };
        Ok(category)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single label or localized object reported by the annotation service.
pub struct LabelAnnotation {
    /// Free-text description such as "Plastic bottle".
    pub description: String,
    /// Confidence in `0.0..=1.0`.
    pub score: f64,
}

impl LabelAnnotation {
    /// Construct an annotation.
    #[must_use]
    pub fn new<S: Into<String>>(description: S, score: f64) -> Self {
        Self {
            description: description.into(),
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Category chosen for an image together with how sure we are.
pub struct ClassificationResult {
    /// Winning category.
    pub category: WasteCategory,
    /// Confidence, possibly an accumulated score above 1.0.
    pub confidence: f64,
}

impl ClassificationResult {
    /// Construct a result.
    #[must_use]
    pub fn new(category: WasteCategory, confidence: f64) -> Self {
        Self {
            category,
            confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
/// Carbon impact in kg CO2e. Negative values are savings, positive values emissions.
pub struct CarbonImpact(f64);

impl CarbonImpact {
    /// Zero impact.
    pub const ZERO: CarbonImpact = CarbonImpact(0.0);

    /// Wrap a raw value, rounding to two decimals.
    #[must_use]
    pub fn from_kg(kg_co2e: f64) -> Self {
        Self(round2(kg_co2e))
    }

    /// Signed value in kg CO2e.
    #[must_use]
    pub fn kg_co2e(self) -> f64 {
        self.0
    }

    /// Whether this impact represents avoided emissions.
    #[must_use]
    pub fn is_savings(self) -> bool {
        self.0 < 0.0
    }
}

impl fmt::Display for CarbonImpact {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_savings() {
            write!(formatter, "{:.2} kg CO2e saved", -self.0)
        } else {
            write!(formatter, "{:.2} kg CO2e emitted", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// How the waste was disposed of.
pub enum Disposal {
    /// Put into the matching bin or brought to a center.
    #[default]
    Proper,
    /// Thrown away without sorting.
    Improper,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// WGS84 coordinate in decimal degrees.
pub struct GeoPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl GeoPoint {
    /// Construct a point.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A logged waste-disposal event.
pub struct DisposalRecord {
    /// Category of the waste.
    pub category: WasteCategory,
    /// Weight in kilograms.
    pub weight_kg: f64,
    /// Whether it was sorted correctly.
    pub disposal: Disposal,
    /// When the event was logged.
    pub recorded_at: DateTime<Utc>,
    /// Where the event happened, if known.
    pub location: Option<GeoPoint>,
    /// Classification confidence (1.0 for manual entries).
    pub confidence: f64,
    /// Points awarded for this event.
    pub points_earned: u32,
    /// Carbon impact of this event.
    pub carbon: CarbonImpact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Achievement unlocked by collecting points.
pub struct Badge {
    /// Display name.
    pub name: String,
    /// Points needed to earn it.
    pub points_required: u32,
    /// Short description.
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A place that accepts waste for recycling or disposal.
pub struct RecyclingCenter {
    /// Name of the center.
    pub name: String,
    /// Street address or vicinity.
    #[serde(default)]
    pub address: String,
    /// Coordinates.
    pub location: GeoPoint,
    /// Accepted categories; empty means unknown / general recycling.
    #[serde(default)]
    pub accepted: Vec<WasteCategory>,
    /// Opening hours as free text.
    #[serde(default)]
    pub hours: Option<String>,
    /// Rating reported by the places service.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Open right now, if the provider knows.
    #[serde(default)]
    pub open_now: Option<bool>,
}

impl RecyclingCenter {
    /// Whether the center takes the given category. Centers without a list accept anything.
    #[must_use]
    pub fn accepts(&self, category: WasteCategory) -> bool {
        self.accepted.is_empty() || self.accepted.contains(&category)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Recycling center annotated with its distance from the search origin.
pub struct NearbyCenter {
    /// The center.
    pub center: RecyclingCenter,
    /// Great-circle distance in kilometers.
    pub distance_km: f64,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
