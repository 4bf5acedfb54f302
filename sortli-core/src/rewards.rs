//! Points, levels, and badges earned by logging disposals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::model::{Badge, Disposal, DisposalRecord, WasteCategory, round2};

/// Points for any properly disposed item.
pub const PROPER_DISPOSAL_POINTS: u32 = 10;
/// Extra points when the item was also recyclable.
pub const RECYCLING_BONUS_POINTS: u32 = 15;
/// Points needed per level.
pub const POINTS_PER_LEVEL: u32 = 100;

/// Points earned for one disposal.
#[must_use]
pub fn points_for(disposal: Disposal, recyclable: bool) -> u32 {
    match (disposal, recyclable) {
        (Disposal::Proper, true) => PROPER_DISPOSAL_POINTS + RECYCLING_BONUS_POINTS,
        (Disposal::Proper, false) => PROPER_DISPOSAL_POINTS,
        (Disposal::Improper, _) => 0,
    }
}

/// The built-in badge ladder, cheapest first.
#[must_use]
pub fn standard_badges() -> Vec<Badge> {
    [
        (
            "Beginner Recycler",
            100,
            "Started your journey towards sustainable waste management.",
        ),
        (
            "Waste Warrior",
            500,
            "Consistently practicing proper waste disposal.",
        ),
        (
            "Eco Champion",
            1000,
            "Making a significant positive impact on the environment.",
        ),
        (
            "Sustainability Expert",
            2500,
            "Leading by example in sustainable waste practices.",
        ),
        (
            "Planet Protector",
            5000,
            "Your efforts have saved significant carbon emissions.",
        ),
    ]
    .into_iter()
    .map(|(name, points_required, description)| Badge {
        name: name.to_owned(),
        points_required,
        description: description.to_owned(),
    })
    .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Weight and carbon logged within one calendar month.
pub struct MonthlyTotals {
    /// Logged weight in kg.
    pub weight_kg: f64,
    /// Sum of carbon impacts in kg CO2e.
    pub carbon_kg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Aggregates over a profile's records.
pub struct ProfileStats {
    /// Total logged weight.
    pub total_waste_kg: f64,
    /// Weight of recyclable categories.
    pub recyclable_waste_kg: f64,
    /// Number of logged disposals.
    pub record_count: usize,
    /// Current points.
    pub points: u32,
    /// Badges earned so far.
    pub badge_count: usize,
    /// Sum of all carbon impacts; negative means net savings.
    pub carbon_balance: f64,
    /// Number of disposals per category; categories never logged are absent.
    pub by_category: BTreeMap<WasteCategory, usize>,
    /// Totals per `YYYY-MM` month (UTC), oldest first.
    pub monthly: BTreeMap<String, MonthlyTotals>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// A user's progress.
pub struct Profile {
    /// Display name.
    pub name: String,
    /// Collected points.
    pub points: u32,
    /// Badges in the order they were earned.
    pub badges: Vec<Badge>,
    /// Sum of carbon impacts in kg CO2e; negative means net savings.
    pub carbon_balance: f64,
    /// Logged disposals, oldest first.
    pub records: Vec<DisposalRecord>,
}

impl Profile {
    /// Create an empty profile.
    #[must_use]
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Current level, starting at 1.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.points / POINTS_PER_LEVEL + 1
    }

    /// Percentage of the way to the next level.
    #[must_use]
    pub fn level_progress(&self) -> f64 {
        f64::from(self.points % POINTS_PER_LEVEL) / f64::from(POINTS_PER_LEVEL) * 100.0
    }

    /// Store a record, add its points and carbon, and return badges unlocked by it.
    pub fn apply(&mut self, record: DisposalRecord, ladder: &[Badge]) -> Vec<Badge> {
        self.points = self.points.saturating_add(record.points_earned);
        self.carbon_balance = round2(self.carbon_balance + record.carbon.kg_co2e());
        self.records.push(record);

        let unlocked: Vec<Badge> = ladder
            .iter()
            .filter(|badge| badge.points_required <= self.points)
            .filter(|badge| !self.badges.iter().any(|owned| owned.name == badge.name))
            .cloned()
            .collect();
        self.badges.extend(unlocked.iter().cloned());
        unlocked
    }

    /// Aggregate statistics, using `catalog` to decide recyclability.
    #[must_use]
    pub fn stats(&self, catalog: &Catalog) -> ProfileStats {
        let mut total = 0.0;
        let mut recyclable = 0.0;
        let mut by_category: BTreeMap<WasteCategory, usize> = BTreeMap::new();
        let mut monthly: BTreeMap<String, MonthlyTotals> = BTreeMap::new();

        for record in &self.records {
            total += record.weight_kg;
            if catalog.is_recyclable(record.category) {
                recyclable += record.weight_kg;
            }
            *by_category.entry(record.category).or_default() += 1;

            let month = monthly
                .entry(record.recorded_at.format("%Y-%m").to_string())
                .or_default();
            month.weight_kg += record.weight_kg;
            month.carbon_kg += record.carbon.kg_co2e();
        }

        for month in monthly.values_mut() {
            month.weight_kg = round2(month.weight_kg);
            month.carbon_kg = round2(month.carbon_kg);
        }

        ProfileStats {
            total_waste_kg: round2(total),
            recyclable_waste_kg: round2(recyclable),
            record_count: self.records.len(),
            points: self.points,
            badge_count: self.badges.len(),
            carbon_balance: self.carbon_balance,
            by_category,
            monthly,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};

    use super::*;
    use crate::model::{CarbonImpact, WasteCategory};

    fn record(category: WasteCategory, weight_kg: f64, points: u32, kg: f64) -> DisposalRecord {
        DisposalRecord {
            category,
            weight_kg,
            disposal: Disposal::Proper,
            recorded_at: Utc::now(),
            location: None,
            confidence: 1.0,
            points_earned: points,
            carbon: CarbonImpact::from_kg(kg),
        }
    }

    #[test]
    fn points_table() {
        assert_eq!(points_for(Disposal::Proper, true), 25);
        assert_eq!(points_for(Disposal::Proper, false), 10);
        assert_eq!(points_for(Disposal::Improper, true), 0);
        assert_eq!(points_for(Disposal::Improper, false), 0);
    }

    #[test]
    fn levels_follow_points() {
        let mut profile = Profile::new("ada");
        assert_eq!(profile.level(), 1);
        profile.points = 250;
        assert_eq!(profile.level(), 3);
        assert!((profile.level_progress() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn badges_are_awarded_once() {
        let ladder = standard_badges();
        let mut profile = Profile::new("ada");

        let first = profile.apply(record(WasteCategory::Plastic, 1.0, 90, -4.2), &ladder);
        assert!(first.is_empty());

        let second = profile.apply(record(WasteCategory::Plastic, 1.0, 25, -4.2), &ladder);
        assert_eq!(second.len(), 1);
        assert_eq!(second.first().map(|badge| badge.name.as_str()), Some("Beginner Recycler"));

        let third = profile.apply(record(WasteCategory::Plastic, 1.0, 25, -4.2), &ladder);
        assert!(third.is_empty());
        assert_eq!(profile.badges.len(), 1);
        assert!((profile.carbon_balance + 12.6).abs() < 1e-9);
    }

    #[test]
    fn big_jump_unlocks_several_badges() {
        let ladder = standard_badges();
        let mut profile = Profile::new("ada");
        let unlocked = profile.apply(record(WasteCategory::Metal, 1.0, 1200, 0.0), &ladder);
        let names: Vec<&str> = unlocked.iter().map(|badge| badge.name.as_str()).collect();
        assert_eq!(names, ["Beginner Recycler", "Waste Warrior", "Eco Champion"]);
    }

    #[test]
    fn stats_split_recyclable_weight() {
        let catalog = Catalog::standard();
        let mut profile = Profile::new("ada");
        profile.apply(record(WasteCategory::Glass, 2.0, 25, -1.26), &[]);
        profile.apply(record(WasteCategory::Hazardous, 0.5, 10, 4.5), &[]);

        let stats = profile.stats(&catalog);
        assert_eq!(stats.record_count, 2);
        assert_eq!(stats.points, 35);
        assert!((stats.total_waste_kg - 2.5).abs() < 1e-9);
        assert!((stats.recyclable_waste_kg - 2.0).abs() < 1e-9);
        assert!((stats.carbon_balance - 3.24).abs() < 1e-9);
    }

    #[test]
    fn stats_count_records_per_category() {
        let catalog = Catalog::standard();
        let mut profile = Profile::new("ada");
        profile.apply(record(WasteCategory::Plastic, 1.0, 25, -4.2), &[]);
        profile.apply(record(WasteCategory::Paper, 0.5, 25, -0.53), &[]);
        profile.apply(record(WasteCategory::Plastic, 0.2, 25, -0.84), &[]);

        let stats = profile.stats(&catalog);
        assert_eq!(stats.by_category.get(&WasteCategory::Plastic), Some(&2));
        assert_eq!(stats.by_category.get(&WasteCategory::Paper), Some(&1));
        assert!(!stats.by_category.contains_key(&WasteCategory::Glass));
        assert_eq!(stats.by_category.values().sum::<usize>(), stats.record_count);
    }

    #[test]
    fn stats_group_weight_and_carbon_by_month() {
        let catalog = Catalog::standard();
        let mut profile = Profile::new("ada");
        let dates = [
            Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0),
            Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0),
            Utc.with_ymd_and_hms(2024, 2, 14, 12, 30, 0),
        ];
        for (date, (weight, kg)) in dates.into_iter().zip([(1.0, -4.2), (2.0, -2.1), (0.5, 1.25)]) {
            let mut entry = record(WasteCategory::Plastic, weight, 25, kg);
            entry.recorded_at = date.single().expect("valid date");
            profile.apply(entry, &[]);
        }

        let stats = profile.stats(&catalog);
        let months: Vec<&str> = stats.monthly.keys().map(String::as_str).collect();
        assert_eq!(months, ["2024-01", "2024-02"]);

        let february = stats.monthly.get("2024-02").expect("february totals");
        assert!((february.weight_kg - 2.5).abs() < 1e-9);
        assert!((february.carbon_kg + 0.85).abs() < 1e-9);
        let january = stats.monthly.get("2024-01").expect("january totals");
        assert!((january.weight_kg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_profile_has_empty_breakdowns() {
        let stats = Profile::new("ada").stats(&Catalog::standard());
        assert!(stats.by_category.is_empty());
        assert!(stats.monthly.is_empty());
    }
}
