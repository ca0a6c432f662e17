use crate::types::{AnalysisResult, ImagePayload};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Classifier {
    /// Returns the category labels for the image, in the order received.
    async fn classify(&self, image: &ImagePayload) -> Result<Vec<String>>;
}

#[async_trait]
pub trait Analyzer {
    async fn analyze(&self, categories: &[String], image: &ImagePayload)
    -> Result<AnalysisResult>;
}
