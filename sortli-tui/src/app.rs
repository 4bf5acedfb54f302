use std::sync::Arc;

use sortli_core::{
    classify::Classification,
    model::{ClassificationResult, Disposal, GeoPoint, NearbyCenter, WasteCategory},
    rewards::Profile,
    service::{DisposalReceipt, SortliService, WasteInput},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Capture,
    Review,
    Progress,
    Centers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    ImagePath,
    Weight,
}

pub(crate) struct App {
    pub service: Arc<SortliService>,
    pub profile: Profile,
    pub location: Option<GeoPoint>,
    pub search_radius_km: f64,

    pub screen: Screen,
    pub focus: Field,
    pub image_path: String,
    pub weight_input: String,
    pub categories: Vec<WasteCategory>,
    pub category_index: usize,
    pub disposal: Disposal,

    pub classification: Option<Classification>,
    /// Category picked on the review screen instead of the classified one
    pub category_override: Option<WasteCategory>,
    pub last_receipt: Option<DisposalReceipt>,
    pub centers: Vec<NearbyCenter>,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(
        service: Arc<SortliService>,
        profile: Profile,
        location: Option<GeoPoint>,
        search_radius_km: f64,
    ) -> Self {
        let categories = service
            .categories()
            .map(|profile| profile.category)
            .collect();
        Self {
            service,
            profile,
            location,
            search_radius_km,
            screen: Screen::Capture,
            focus: Field::ImagePath,
            image_path: String::new(),
            weight_input: String::from("1.0"),
            categories,
            category_index: 0,
            disposal: Disposal::Proper,
            classification: None,
            category_override: None,
            last_receipt: None,
            centers: Vec::new(),
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn selected_category(&self) -> Option<WasteCategory> {
        self.categories.get(self.category_index).copied()
    }

    /// Image bytes when a path was typed, otherwise the highlighted category.
    pub(crate) fn capture_input(&self) -> Result<WasteInput, String> {
        let path = self.image_path.trim();
        if path.is_empty() {
            return self
                .selected_category()
                .map(WasteInput::Manual)
                .ok_or_else(|| "Pick a category or type an image path".to_owned());
        }

        std::fs::read(path)
            .map(WasteInput::Image)
            .map_err(|err| format!("Cannot read {path}: {err}"))
    }

    pub(crate) fn weight_kg(&self) -> Result<f64, String> {
        self.weight_input
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|weight| weight.is_finite() && *weight >= 0.0)
            .ok_or_else(|| format!("Invalid weight: {}", self.weight_input))
    }

    /// Result that will be logged: the classification unless it was corrected by hand.
    pub(crate) fn reviewed_result(&self) -> Option<ClassificationResult> {
        let classification = self.classification.as_ref()?;
        Some(match self.category_override {
            Some(category) => ClassificationResult::new(category, 1.0),
            None => classification.result(),
        })
    }

    /// Move the reviewed category one step through the category list.
    pub(crate) fn step_override(&mut self, forward: bool) {
        let Some(current) = self.reviewed_result().map(|result| result.category) else {
            return;
        };
        let len = self.categories.len();
        let Some(position) = self.categories.iter().position(|&category| category == current)
        else {
            self.category_override = self.categories.first().copied();
            return;
        };
        let next = if forward {
            (position + 1) % len
        } else {
            (position + len - 1) % len
        };
        self.category_override = self.categories.get(next).copied();
    }

    /// Drop the reviewed classification and any correction.
    pub(crate) fn clear_review(&mut self) {
        self.classification = None;
        self.category_override = None;
    }

    pub(crate) fn toggle_disposal(&mut self) {
        self.disposal = match self.disposal {
            Disposal::Proper => Disposal::Improper,
            Disposal::Improper => Disposal::Proper,
        };
    }

    pub(crate) fn focused_input(&mut self) -> &mut String {
        match self.focus {
            Field::ImagePath => &mut self.image_path,
            Field::Weight => &mut self.weight_input,
        }
    }
}
