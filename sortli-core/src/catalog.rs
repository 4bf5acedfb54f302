//! Static per-category configuration: carbon factors, recyclability, keywords, and tips.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::WasteCategory;

/// Factor used for categories missing from a catalog.
pub const DEFAULT_CARBON_FACTOR: f64 = 2.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Everything sortli knows about one waste category.
pub struct CategoryProfile {
    /// Category described by this profile.
    pub category: WasteCategory,
    /// kg CO2e per kg of waste. Never negative.
    pub carbon_factor: f64,
    /// Whether the category can be recycled.
    pub recyclable: bool,
    /// One-line description for the front end.
    pub description: String,
    /// Lowercase keywords matched against annotation labels.
    pub keywords: Vec<String>,
    /// Disposal recommendations.
    pub tips: Vec<String>,
}

impl CategoryProfile {
    fn fallback(category: WasteCategory) -> Self {
        Self {
            category,
            carbon_factor: DEFAULT_CARBON_FACTOR,
            recyclable: false,
            description: String::new(),
            keywords: Vec::new(),
            tips: Vec::new(),
        }
    }
}

/// Immutable lookup table from category to profile.
///
/// Build it once at startup and share it behind an `Arc`. Every category has a profile:
/// categories left out at construction get the default one.
#[derive(Debug, Clone)]
pub struct Catalog {
    profiles: [CategoryProfile; WasteCategory::ALL.len()],
}

impl Catalog {
    /// Build a catalog from the given profiles. Negative factors are clamped to zero and
    /// keywords are lowercased. Missing categories get a profile with
    /// [`DEFAULT_CARBON_FACTOR`], no keywords, and no recycling.
    #[must_use]
    pub fn new(profiles: Vec<CategoryProfile>) -> Self {
        let mut configured: BTreeMap<WasteCategory, CategoryProfile> = profiles
            .into_iter()
            .map(|mut profile| {
                profile.carbon_factor = profile.carbon_factor.max(0.0);
                profile.keywords = profile
                    .keywords
                    .iter()
                    .map(|keyword| keyword.trim().to_lowercase())
                    .filter(|keyword| !keyword.is_empty())
                    .collect();
                (profile.category, profile)
            })
            .collect();

        Self {
            profiles: WasteCategory::ALL.map(|category| {
                configured
                    .remove(&category)
                    .unwrap_or_else(|| CategoryProfile::fallback(category))
            }),
        }
    }

    /// The built-in catalog.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            WasteCategory::ALL
                .into_iter()
                .map(standard_profile)
                .collect(),
        )
    }

    /// Profile for `category`.
    #[must_use]
    pub fn profile(&self, category: WasteCategory) -> &CategoryProfile {
        let [plastic, paper, glass, metal, organic, electronic, hazardous, non_recyclable] =
            &self.profiles;
        match category {
            WasteCategory::Plastic => plastic,
            WasteCategory::Paper => paper,
            WasteCategory::Glass => glass,
            WasteCategory::Metal => metal,
            WasteCategory::Organic => organic,
            WasteCategory::Electronic => electronic,
            WasteCategory::Hazardous => hazardous,
            WasteCategory::NonRecyclable => non_recyclable,
        }
    }

    /// Iterate over every profile in catalog order.
    pub fn profiles(&self) -> impl Iterator<Item = &CategoryProfile> {
        self.profiles.iter()
    }

    /// Shorthand for `profile(category).recyclable`.
    #[must_use]
    pub fn is_recyclable(&self, category: WasteCategory) -> bool {
        self.profile(category).recyclable
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_profile(category: WasteCategory) -> CategoryProfile {
    let (carbon_factor, recyclable, description, keywords, tips): (
        f64,
        bool,
        &str,
        &[&str],
        &[&str],
    ) = match category {
        WasteCategory::Plastic => (
            6.0,
            true,
            "Includes bottles, containers, bags, and packaging.",
            &[
                "plastic",
                "bottle",
                "plastic bottle",
                "container",
                "plastic container",
                "packaging",
                "polymer",
                "tupperware",
            ],
            RECYCLABLE_TIPS,
        ),
        WasteCategory::Paper => (
            1.5,
            true,
            "Includes newspapers, magazines, office paper, and cardboard.",
            &[
                "paper",
                "cardboard",
                "carton",
                "newspaper",
                "magazine",
                "book",
                "envelope",
            ],
            RECYCLABLE_TIPS,
        ),
        WasteCategory::Glass => (
            0.9,
            true,
            "Includes bottles, jars, and containers.",
            &["glass", "glass bottle", "jar", "wine bottle", "window"],
            RECYCLABLE_TIPS,
        ),
        WasteCategory::Metal => (
            4.0,
            true,
            "Includes cans, aluminum foil, and scrap metal.",
            &[
                "metal",
                "aluminum",
                "aluminium",
                "aluminum can",
                "steel",
                "tin",
                "can",
                "foil",
            ],
            RECYCLABLE_TIPS,
        ),
        WasteCategory::Organic => (
            0.8,
            true,
            "Includes food waste, garden waste, and compostable materials.",
            &[
                "food",
                "food waste",
                "fruit",
                "vegetable",
                "meat",
                "leaf",
                "leaves",
                "plant",
                "grass",
                "wood",
                "garden",
                "coffee grounds",
                "eggshell",
                "nutshell",
            ],
            &[
                "Consider home composting",
                "Remove any non-organic stickers or labels",
                "Cut large items into smaller pieces for faster decomposition",
                "Keep meat and dairy out of home compost bins",
            ],
        ),
        WasteCategory::Electronic => (
            20.0,
            true,
            "Includes devices, cables, and electrical components.",
            &[
                "electronic",
                "electronics",
                "electronic device",
                "device",
                "computer",
                "phone",
                "tablet",
                "television",
                "printer",
                "keyboard",
                "charger",
                "cable",
            ],
            &[
                "Check if the manufacturer has a take-back program",
                "Remove batteries before recycling",
                "Delete personal data from devices",
                "Many electronics stores offer free recycling services",
            ],
        ),
        WasteCategory::Hazardous => (
            30.0,
            false,
            "Includes chemicals, batteries, medical waste, and toxic materials.",
            &[
                "battery",
                "chemical",
                "paint",
                "oil",
                "medicine",
                "medication",
                "pharmaceutical",
                "pesticide",
                "aerosol",
                "light bulb",
            ],
            &[
                "Never mix different hazardous materials",
                "Store in original containers when possible",
                "Check for special collection events in your area",
                "Many stores accept batteries for recycling",
            ],
        ),
        WasteCategory::NonRecyclable => (
            DEFAULT_CARBON_FACTOR,
            false,
            "General waste that cannot be recycled.",
            &[
                "styrofoam",
                "plastic bag",
                "wrapper",
                "diaper",
                "wax paper",
                "ceramic",
                "porcelain",
                "cigarette butt",
            ],
            &[
                "Try to find alternatives to single-use items",
                "Consider products with less packaging",
                "Some items like plastic bags may be recyclable at grocery stores",
                "Reuse items when possible before disposing",
            ],
        ),
    };

    CategoryProfile {
        category,
        carbon_factor,
        recyclable,
        description: description.to_owned(),
        keywords: keywords.iter().map(|&keyword| keyword.to_owned()).collect(),
        tips: tips.iter().map(|&tip| tip.to_owned()).collect(),
    }
}

const RECYCLABLE_TIPS: &[&str] = &[
    "Rinse containers before recycling",
    "Remove caps and lids",
    "Flatten cardboard boxes",
    "Check local recycling guidelines for specific items",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_covers_every_category() {
        let catalog = Catalog::standard();
        for category in WasteCategory::ALL {
            let profile = catalog.profile(category);
            assert_eq!(profile.category, category);
            assert!(profile.carbon_factor >= 0.0);
            assert!(!profile.keywords.is_empty(), "{category} has no keywords");
        }
        assert!(catalog.is_recyclable(WasteCategory::Plastic));
        assert!(!catalog.is_recyclable(WasteCategory::Hazardous));
    }

    #[test]
    fn missing_category_uses_default_factor() {
        let catalog = Catalog::new(vec![standard_profile(WasteCategory::Glass)]);
        let profile = catalog.profile(WasteCategory::Electronic);
        assert!((profile.carbon_factor - DEFAULT_CARBON_FACTOR).abs() < f64::EPSILON);
        assert!(!profile.recyclable);
        assert!(profile.keywords.is_empty());
    }

    #[test]
    fn default_profile_keeps_the_requested_category() {
        let catalog = Catalog::new(vec![standard_profile(WasteCategory::Glass)]);
        for category in WasteCategory::ALL {
            assert_eq!(catalog.profile(category).category, category);
        }
        let order: Vec<WasteCategory> = catalog.profiles().map(|profile| profile.category).collect();
        assert_eq!(order, WasteCategory::ALL);
        assert!((catalog.profile(WasteCategory::Glass).carbon_factor - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn normalizes_factors_and_keywords() {
        let catalog = Catalog::new(vec![CategoryProfile {
            category: WasteCategory::Paper,
            carbon_factor: -3.0,
            recyclable: true,
            description: String::new(),
            keywords: vec!["  NewsPaper ".to_owned(), String::new()],
            tips: Vec::new(),
        }]);
        let profile = catalog.profile(WasteCategory::Paper);
        assert!(profile.carbon_factor.abs() < f64::EPSILON);
        assert_eq!(profile.keywords, vec!["newspaper".to_owned()]);
    }

    #[test]
    fn keywords_are_not_shared_between_categories() {
        let catalog = Catalog::standard();
        let mut seen = std::collections::HashMap::new();
        for profile in catalog.profiles() {
            for keyword in &profile.keywords {
                let previous = seen.insert(keyword.clone(), profile.category);
                assert!(previous.is_none(), "keyword {keyword} is listed twice");
            }
        }
    }
}
