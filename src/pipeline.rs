//! Classification followed by generative analysis, with substitution.
//!
//! Each stage produces a [`StageOutcome`]. Failures are never returned to the
//! caller; they are mapped to a canonical fallback by
//! [`StageOutcome::or_fallback`], so [`Pipeline::run`] always yields a
//! complete [`AnalyzeResponse`].

use metrics::counter;
use std::sync::Arc;

use crate::engine::{Analyzer, Classifier};
use crate::types::{AnalysisResult, AnalyzeResponse, FALLBACK_CATEGORY, ImagePayload};

pub const MESSAGE_SUCCESS: &str = "Analysis completed successfully";
pub const MESSAGE_DEGRADED: &str = "Analysis completed with limited results";

#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Success(T),
    Failed(String),
}

impl<T> StageOutcome<T> {
    fn from_result(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(e) => Self::Failed(format!("{:#}", e)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn or_fallback(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failed(_) => fallback(),
        }
    }
}

pub fn fallback_categories() -> Vec<String> {
    vec![FALLBACK_CATEGORY.to_string()]
}

#[derive(Clone)]
pub struct Pipeline {
    classifier: Arc<dyn Classifier + Send + Sync>,
    analyzer: Arc<dyn Analyzer + Send + Sync>,
}

impl Pipeline {
    pub fn new(
        classifier: Arc<dyn Classifier + Send + Sync>,
        analyzer: Arc<dyn Analyzer + Send + Sync>,
    ) -> Self {
        Self {
            classifier,
            analyzer,
        }
    }

    pub async fn classify(&self, image: &ImagePayload) -> StageOutcome<Vec<String>> {
        let outcome = StageOutcome::from_result(self.classifier.classify(image).await);
        if let StageOutcome::Failed(reason) = &outcome {
            counter!("classification_fallbacks_total").increment(1);
            tracing::warn!(error = %reason, "Classification failed, using fallback category");
        }
        outcome
    }

    pub async fn analyze(
        &self,
        categories: &[String],
        image: &ImagePayload,
    ) -> StageOutcome<AnalysisResult> {
        let outcome = StageOutcome::from_result(self.analyzer.analyze(categories, image).await);
        if let StageOutcome::Failed(reason) = &outcome {
            counter!("analysis_fallbacks_total").increment(1);
            tracing::warn!(error = %reason, "Analysis failed, using unavailable result");
        }
        outcome
    }

    /// Runs both stages in order. Never fails.
    #[tracing::instrument(skip(self, image), fields(image_bytes = image.bytes.len()))]
    pub async fn run(&self, image: &ImagePayload) -> AnalyzeResponse {
        let categories = self.classify(image).await.or_fallback(fallback_categories);
        tracing::info!(?categories, "Categories resolved");

        let analysis = self.analyze(&categories, image).await;
        let message = if analysis.is_success() {
            MESSAGE_SUCCESS
        } else {
            MESSAGE_DEGRADED
        };

        AnalyzeResponse {
            message: message.to_string(),
            analysis: analysis.or_fallback(AnalysisResult::unavailable),
            categories,
        }
    }
}
