use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

use crate::engine::Classifier;
use crate::types::{CategoriesResponse, ImagePayload};

/// Client for the external classification service's `/analyze` endpoint.
#[derive(Clone)]
pub struct HttpClassifier {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpClassifier {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build classifier HTTP client")?;

        Ok(Self {
            endpoint: format!("{}/analyze", base_url.trim_end_matches('/')),
            client,
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    #[tracing::instrument(skip(self, image), fields(image_bytes = image.bytes.len()))]
    async fn classify(&self, image: &ImagePayload) -> Result<Vec<String>> {
        if image.bytes.is_empty() {
            bail!("Refusing to classify an empty image");
        }

        let part = Part::bytes(image.bytes.clone())
            .file_name("image.jpg")
            .mime_str(image.mime_type())
            .context("Invalid image content type")?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach classification service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Classification service error ({}): {}", status, body);
        }

        let result: CategoriesResponse = response
            .json()
            .await
            .context("Failed to parse classification response")?;

        if result.categories.is_empty() {
            bail!("Classification service returned no categories");
        }

        tracing::debug!(categories = ?result.categories, "Classification received");
        Ok(result.categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Multipart, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn image() -> ImagePayload {
        ImagePayload::new(vec![0xff, 0xd8, 0xff, 0xe0], Some("image/jpeg".into()))
    }

    #[tokio::test]
    async fn sends_image_field_and_returns_categories() {
        let router = Router::new().route(
            "/analyze",
            post(|mut multipart: Multipart| async move {
                let field = multipart.next_field().await.unwrap().unwrap();
                assert_eq!(field.name(), Some("image"));
                assert_eq!(field.file_name(), Some("image.jpg"));
                let bytes = field.bytes().await.unwrap();
                assert_eq!(bytes.len(), 4);
                Json(json!({"categories": ["plastic bottle", "Recyclable"]}))
            }),
        );
        let base = spawn(router).await;
        let classifier =
            HttpClassifier::new(&format!("{}/", base), Duration::from_secs(5)).unwrap();

        let categories = classifier.classify(&image()).await.unwrap();
        assert_eq!(categories, vec!["plastic bottle", "Recyclable"]);
    }

    #[tokio::test]
    async fn malformed_declared_type_is_sent_as_jpeg() {
        let router = Router::new().route(
            "/analyze",
            post(|mut multipart: Multipart| async move {
                let field = multipart.next_field().await.unwrap().unwrap();
                assert_eq!(field.content_type(), Some("image/jpeg"));
                Json(json!({"categories": ["plastic bottle"]}))
            }),
        );
        let base = spawn(router).await;
        let classifier = HttpClassifier::new(&base, Duration::from_secs(5)).unwrap();

        for declared in ["image/png; x", "image/ bad"] {
            let image = ImagePayload::new(vec![0xff, 0xd8, 0xff], Some(declared.into()));
            let categories = classifier.classify(&image).await.unwrap();
            assert_eq!(categories, vec!["plastic bottle"], "{declared}");
        }
    }

    #[tokio::test]
    async fn non_success_status_fails() {
        let router = Router::new().route(
            "/analyze",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "boom", "categories": ["general waste"]})),
                )
            }),
        );
        let base = spawn(router).await;
        let classifier = HttpClassifier::new(&base, Duration::from_secs(5)).unwrap();

        let err = classifier.classify(&image()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn malformed_body_fails() {
        let router = Router::new().route(
            "/analyze",
            post(|| async { Json(json!({"labels": ["glass"]})) }),
        );
        let base = spawn(router).await;
        let classifier = HttpClassifier::new(&base, Duration::from_secs(5)).unwrap();

        assert!(classifier.classify(&image()).await.is_err());
    }

    #[tokio::test]
    async fn empty_category_list_fails() {
        let router = Router::new().route(
            "/analyze",
            post(|| async { Json::<Value>(json!({"categories": []})) }),
        );
        let base = spawn(router).await;
        let classifier = HttpClassifier::new(&base, Duration::from_secs(5)).unwrap();

        assert!(classifier.classify(&image()).await.is_err());
    }

    #[tokio::test]
    async fn unreachable_service_fails() {
        let classifier =
            HttpClassifier::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        assert!(classifier.classify(&image()).await.is_err());
    }
}
