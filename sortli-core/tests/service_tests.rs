//! End-to-end tests of the service facade with in-memory backends.

use std::sync::Arc;

use async_trait::async_trait;
use sortli_core::{
    AnnotationPort, Backends, CarbonModel, Catalog, CenterPort, Classification, DisposalEntry,
    GeoPoint, LabelAnnotation, PortError, Profile, RecyclingCenter, ServiceOptions,
    SortliService, WasteCategory, WasteInput,
};

struct CannedLabels(Vec<LabelAnnotation>);

#[async_trait]
impl AnnotationPort for CannedLabels {
    fn name(&self) -> &str {
        "canned"
    }

    async fn labels(&self, _image: &[u8]) -> Result<Vec<LabelAnnotation>, PortError> {
        Ok(self.0.clone())
    }

    async fn objects(&self, _image: &[u8]) -> Result<Vec<LabelAnnotation>, PortError> {
        Ok(Vec::new())
    }
}

struct BrokenCenters;

#[async_trait]
impl CenterPort for BrokenCenters {
    fn name(&self) -> &str {
        "broken"
    }

    async fn nearby(
        &self,
        _origin: GeoPoint,
        _radius_km: f64,
        _category: Option<WasteCategory>,
    ) -> Result<Vec<RecyclingCenter>, PortError> {
        Err(PortError::Api("OVER_QUERY_LIMIT".to_owned()))
    }
}

struct FixedCenters(Vec<RecyclingCenter>);

#[async_trait]
impl CenterPort for FixedCenters {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn nearby(
        &self,
        _origin: GeoPoint,
        _radius_km: f64,
        _category: Option<WasteCategory>,
    ) -> Result<Vec<RecyclingCenter>, PortError> {
        Ok(self.0.clone())
    }
}

fn center(name: &str, lat: f64, lng: f64) -> RecyclingCenter {
    RecyclingCenter {
        name: name.to_owned(),
        address: format!("{name} street 1"),
        location: GeoPoint::new(lat, lng),
        accepted: Vec::new(),
        hours: Some("Mon-Sat: 8AM-6PM".to_owned()),
        rating: None,
        open_now: None,
    }
}

fn service(backends: Backends, options: ServiceOptions) -> SortliService {
    SortliService::new(Arc::new(Catalog::standard()), backends, options)
}

#[tokio::test]
async fn photo_to_receipt() {
    let backends = Backends::offline().with_annotations(Arc::new(CannedLabels(vec![
        LabelAnnotation::new("Plastic bottle", 0.9),
        LabelAnnotation::new("Drinking water", 0.7),
    ])));
    let service = service(backends, ServiceOptions::default());
    let mut profile = Profile::new("sam");

    let outcome = service.classify(WasteInput::Image(vec![0_u8; 16])).await;
    assert!(matches!(outcome, Classification::Annotated(_)));
    let result = outcome.result();
    assert_eq!(result.category, WasteCategory::Plastic);

    let receipt = service.log_disposal(
        &mut profile,
        DisposalEntry {
            result,
            weight_kg: 2.0,
            disposal: sortli_core::Disposal::Proper,
            location: Some(GeoPoint::new(50.94, 6.96)),
        },
    );

    assert!(receipt.recyclable);
    assert_eq!(receipt.record.points_earned, 25);
    assert!((receipt.record.carbon.kg_co2e() + 8.4).abs() < 1e-9);
    assert_eq!(receipt.total_points, 25);
    assert_eq!(profile.records.len(), 1);
    assert!((service.footprint(&profile).total_savings - 8.4).abs() < 1e-9);
}

#[tokio::test]
async fn manual_entry_has_full_confidence() {
    let service = service(Backends::offline(), ServiceOptions::default());
    let outcome = service
        .classify(WasteInput::Manual(WasteCategory::Hazardous))
        .await;
    let result = outcome.result();
    assert!(matches!(outcome, Classification::Manual(_)));
    assert_eq!(result.category, WasteCategory::Hazardous);
    assert!((result.confidence - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn offline_classification_still_answers() {
    let service = service(Backends::offline(), ServiceOptions::default());
    let outcome = service.classify(WasteInput::Image(b"garbage".to_vec())).await;
    assert!(outcome.is_fallback());
    assert!(WasteCategory::ALL.contains(&outcome.result().category));
}

#[tokio::test]
async fn savings_model_applies_to_logged_disposals() {
    let options = ServiceOptions {
        carbon_model: CarbonModel::Savings,
        ..ServiceOptions::default()
    };
    let service = service(Backends::offline(), options);
    let mut profile = Profile::new("sam");

    assert!((service.estimate_carbon(WasteCategory::Plastic, 2.0).kg_co2e() + 12.0).abs() < 1e-9);

    let receipt = service.log_disposal(
        &mut profile,
        DisposalEntry {
            result: sortli_core::ClassificationResult::new(WasteCategory::NonRecyclable, 0.5),
            weight_kg: 3.0,
            disposal: sortli_core::Disposal::Proper,
            location: None,
        },
    );
    assert!(receipt.record.carbon.kg_co2e().abs() < f64::EPSILON);
    assert_eq!(receipt.record.points_earned, 10);
    assert!(!receipt.recyclable);
}

#[tokio::test]
async fn center_lookup_falls_back_to_local_directory() {
    let origin = GeoPoint::new(50.0, 8.0);
    let options = ServiceOptions {
        local_centers: vec![
            center("Across town", 50.3, 8.0),
            center("Around the corner", 50.01, 8.01),
        ],
        ..ServiceOptions::default()
    };
    let service = service(
        Backends::offline().with_centers(Arc::new(BrokenCenters)),
        options,
    );

    let nearby = service.nearby_centers(origin, 10.0, None).await;
    assert_eq!(nearby.len(), 1);
    assert_eq!(
        nearby.first().map(|item| item.center.name.as_str()),
        Some("Around the corner")
    );
}

#[tokio::test]
async fn remote_centers_are_sorted_by_distance() {
    let origin = GeoPoint::new(50.0, 8.0);
    let service = service(
        Backends::offline().with_centers(Arc::new(FixedCenters(vec![
            center("second", 50.03, 8.0),
            center("first", 50.01, 8.0),
        ]))),
        ServiceOptions::default(),
    );

    let nearby = service
        .nearby_centers(origin, 5.0, Some(WasteCategory::Glass))
        .await;
    let names: Vec<&str> = nearby.iter().map(|item| item.center.name.as_str()).collect();
    assert_eq!(names, ["first", "second"]);
    assert!(nearby.iter().all(|item| item.distance_km > 0.0));
}

#[test]
fn tips_exist_for_every_category() {
    let service = service(Backends::offline(), ServiceOptions::default());
    for profile in service.categories() {
        assert!(!service.tips(profile.category).is_empty());
    }
}
