//! Waste classification: keyword scoring over annotation labels with local fallbacks.

use std::sync::Arc;
use std::time::Duration;

use image::imageops::FilterType;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::model::{ClassificationResult, LabelAnnotation, WasteCategory};
use crate::ports::{AnnotationPort, PortError};

/// Accumulated scores below this value are not trusted.
pub const CONFIDENCE_THRESHOLD: f64 = 0.1;
/// Discount applied to labels that only contain a keyword as a substring.
pub const PARTIAL_MATCH_WEIGHT: f64 = 0.7;
/// Confidence reported when the service answered but nothing matched.
pub const INCONCLUSIVE_CONFIDENCE: f64 = 0.5;

/// Side length the color heuristic downsamples images to.
const HEURISTIC_SIZE: u32 = 100;

#[derive(thiserror::Error, Debug)]
/// Reasons a classification could not use the annotation service's answer.
pub enum ClassifyError {
    /// The service could not be reached, rejected the call, or timed out.
    #[error("Annotation service unavailable: {0}")]
    ServiceUnavailable(#[from] PortError),
    /// The service answered but no category scored above the threshold.
    #[error("No confident match (best score {best_score:.2})")]
    NoConfidentMatch {
        /// Highest accumulated score seen.
        best_score: f64,
    },
}

#[derive(Debug)]
/// Outcome of a classification call. Every variant carries a usable result.
pub enum Classification {
    /// Category picked by the user.
    Manual(ClassificationResult),
    /// Confident keyword match from the annotation service.
    Annotated(ClassificationResult),
    /// Service answered without a confident match; catch-all category.
    Inconclusive {
        /// Catch-all result.
        result: ClassificationResult,
        /// Highest accumulated score seen before falling back.
        best_score: f64,
    },
    /// Service unavailable; result comes from the local color heuristic.
    Degraded {
        /// Heuristic result.
        result: ClassificationResult,
        /// Why the service could not be used.
        reason: ClassifyError,
    },
}

impl Classification {
    /// The best-effort result regardless of how it was obtained.
    #[must_use]
    pub fn result(&self) -> ClassificationResult {
        match self {
            Classification::Manual(result) | Classification::Annotated(result) => *result,
            Classification::Inconclusive { result, .. } | Classification::Degraded { result, .. } => {
                *result
            }
        }
    }

    /// Whether the result is a fallback rather than a confident answer.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            Classification::Inconclusive { .. } | Classification::Degraded { .. }
        )
    }
}

/// Per-category score accumulators in catalog order.
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    scores: [f64; WasteCategory::ALL.len()],
}

impl Scoreboard {
    /// Add the keyword matches of every annotation to the accumulators.
    ///
    /// A label is claimed by its most specific whole-word keyword (most tokens); every
    /// category holding such a keyword gets the full label score once. Labels without any
    /// whole-word match credit each category containing one of its keywords as a substring
    /// with the discounted score.
    pub fn accumulate(&mut self, catalog: &Catalog, annotations: &[LabelAnnotation]) {
        for annotation in annotations {
            let label = annotation.description.trim().to_lowercase();
            let label_tokens = tokenize(&label);
            if label_tokens.is_empty() {
                continue;
            }
            let score = annotation.score.max(0.0);

            let mut claims: Vec<(WasteCategory, usize)> = Vec::new();
            let mut partial: Vec<WasteCategory> = Vec::new();
            for profile in catalog.profiles() {
                let mut longest = 0;
                let mut contains = false;
                for keyword in &profile.keywords {
                    let keyword_tokens = tokenize(keyword);
                    if is_whole_word(&label_tokens, &keyword_tokens) {
                        longest = longest.max(keyword_tokens.len());
                    } else if label.contains(keyword.as_str()) {
                        contains = true;
                    }
                }
                if longest > 0 {
                    claims.push((profile.category, longest));
                } else if contains {
                    partial.push(profile.category);
                }
            }

            let most_specific = claims.iter().map(|&(_, len)| len).max().unwrap_or(0);
            if most_specific > 0 {
                for (category, len) in claims {
                    if len == most_specific {
                        self.add(category, score);
                    }
                }
            } else {
                for category in partial {
                    self.add(category, score * PARTIAL_MATCH_WEIGHT);
                }
            }
        }
    }

    /// Accumulated score for a category.
    #[must_use]
    pub fn score(&self, category: WasteCategory) -> f64 {
        self.scores.get(slot(category)).copied().unwrap_or(0.0)
    }

    /// Highest scoring category; ties go to the earlier category.
    #[must_use]
    pub fn winner(&self) -> ClassificationResult {
        let mut best = ClassificationResult::new(WasteCategory::NonRecyclable, 0.0);
        for category in WasteCategory::ALL {
            let score = self.score(category);
            if score > best.confidence {
                best = ClassificationResult::new(category, score);
            }
        }
        best
    }

    fn add(&mut self, category: WasteCategory, amount: f64) {
        if let Some(total) = self.scores.get_mut(slot(category)) {
            *total += amount;
        }
    }
}

fn slot(category: WasteCategory) -> usize {
    WasteCategory::ALL
        .iter()
        .position(|candidate| *candidate == category)
        .unwrap_or(0)
}

fn tokenize(text: &str) -> Vec<&str> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect()
}

fn is_whole_word(label_tokens: &[&str], keyword_tokens: &[&str]) -> bool {
    !keyword_tokens.is_empty()
        && label_tokens
            .windows(keyword_tokens.len())
            .any(|window| window == keyword_tokens)
}

/// Pick a category from the average color of the image.
///
/// Never fails: undecodable input yields the catch-all category with low confidence.
#[must_use]
pub fn color_heuristic(image: &[u8]) -> ClassificationResult {
    let decoded = match image::load_from_memory(image) {
        Ok(decoded) => decoded,
        Err(err) => {
            warn!("Could not decode image for local classification: {err}");
            return ClassificationResult::new(WasteCategory::NonRecyclable, 0.3);
        }
    };

    let pixels = decoded
        .resize_exact(HEURISTIC_SIZE, HEURISTIC_SIZE, FilterType::Triangle)
        .to_rgb8();

    let mut sums = [0_u64; 3];
    let mut count = 0_u64;
    for pixel in pixels.pixels() {
        let [red, green, blue] = pixel.0;
        sums = [
            sums[0] + u64::from(red),
            sums[1] + u64::from(green),
            sums[2] + u64::from(blue),
        ];
        count += 1;
    }
    if count == 0 {
        return ClassificationResult::new(WasteCategory::NonRecyclable, 0.3);
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "channel sums stay far below 2^52"
    )]
    let [red, green, blue] = sums.map(|sum| sum as f64 / count as f64);

    let result = if green > red && green > blue {
        ClassificationResult::new(WasteCategory::Organic, 0.6)
    } else if blue > red && blue > green {
        ClassificationResult::new(WasteCategory::Plastic, 0.6)
    } else if red > green && red > blue && red > 150.0 && green > 150.0 {
        ClassificationResult::new(WasteCategory::Hazardous, 0.5)
    } else {
        ClassificationResult::new(WasteCategory::NonRecyclable, 0.4)
    };

    debug!(red, green, blue, category = %result.category, "Local color classification");
    result
}

/// Runs the annotation service and resolves its labels into a category.
pub struct Classifier {
    catalog: Arc<Catalog>,
    port: Option<Arc<dyn AnnotationPort>>,
    timeout: Duration,
    object_pass: bool,
}

impl Classifier {
    /// Create a classifier. Without a port every image goes through the color heuristic.
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        port: Option<Arc<dyn AnnotationPort>>,
        timeout: Duration,
        object_pass: bool,
    ) -> Self {
        Self {
            catalog,
            port,
            timeout,
            object_pass,
        }
    }

    /// Classify an image. Never fails; see [`Classification`] for how the result was obtained.
    pub async fn classify(&self, image: &[u8]) -> Classification {
        let Some(port) = self.port.as_deref() else {
            return self.degrade(image, PortError::MissingCredentials);
        };

        let labels = match self.bounded(port.labels(image)).await {
            Ok(labels) => labels,
            Err(err) => return self.degrade(image, err),
        };

        let mut board = Scoreboard::default();
        board.accumulate(&self.catalog, &labels);
        let mut best = board.winner();
        debug!(labels = labels.len(), best = ?best, "Label pass finished");

        if best.confidence < CONFIDENCE_THRESHOLD && self.object_pass {
            match self.bounded(port.objects(image)).await {
                Ok(objects) => {
                    board.accumulate(&self.catalog, &objects);
                    best = board.winner();
                    debug!(objects = objects.len(), best = ?best, "Object pass finished");
                }
                Err(err) => warn!("Object localization via {} failed: {err}", port.name()),
            }
        }

        if best.confidence < CONFIDENCE_THRESHOLD {
            let result =
                ClassificationResult::new(WasteCategory::NonRecyclable, INCONCLUSIVE_CONFIDENCE);
            info!(
                best_score = best.confidence,
                "No confident match, using {}", result.category
            );
            return Classification::Inconclusive {
                result,
                best_score: best.confidence,
            };
        }

        info!(
            "Classified waste as {} with confidence {:.2}",
            best.category, best.confidence
        );
        Classification::Annotated(best)
    }

    async fn bounded<F>(&self, call: F) -> Result<Vec<LabelAnnotation>, PortError>
    where
        F: Future<Output = Result<Vec<LabelAnnotation>, PortError>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(PortError::Timeout))
    }

    fn degrade(&self, image: &[u8], err: PortError) -> Classification {
        warn!("Falling back to local classification: {err}");
        Classification::Degraded {
            result: color_heuristic(image),
            reason: ClassifyError::ServiceUnavailable(err),
        }
    }
}
