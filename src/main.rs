mod classifier;
mod config;
mod engine;
mod error;
mod extract;
mod gemini;
mod pipeline;
mod prompt;
mod types;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    http::{Method, header},
    response::Json,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use clap::Parser;
use metrics::counter;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use classifier::HttpClassifier;
use config::Config;
use error::ApiError;
use gemini::{GeminiAnalyzer, GeminiConfig};
use pipeline::Pipeline;
use types::{AnalyzeResponse, ImagePayload};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let config = Config::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,ecoscan=debug".into());
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if let Err(e) = dotenv {
        tracing::debug!("No .env file loaded: {}", e);
    }
    config.validate()?;
    tracing::info!(
        classifier_url = %config.classifier_url,
        gemini_model = %config.gemini_model,
        "Starting analysis server"
    );

    let classifier = HttpClassifier::new(&config.classifier_url, config.request_timeout())?;
    let analyzer = GeminiAnalyzer::new(GeminiConfig {
        base_url: config.gemini_base_url.clone(),
        model: config.gemini_model.clone(),
        api_key: config.gemini_api_key.clone(),
        timeout: config.request_timeout(),
    })?;
    let pipeline = Pipeline::new(Arc::new(classifier), Arc::new(analyzer));

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = app(AppState::new(pipeline), config.max_upload_bytes)
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.server_address()).await?;
    tracing::info!("Server running on http://{}", config.server_address());

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Clone)]
struct AppState {
    pipeline: Pipeline,
}

impl AppState {
    fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/analyze", post(analyze_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

async fn read_image(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ImagePayload, ApiError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().map(|c| c.to_string());
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::EmptyImage);
        }
        return Ok(ImagePayload::new(bytes.to_vec(), content_type));
    }
    Err(ApiError::MissingImage)
}

#[tracing::instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4().simple()))]
async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    counter!("analysis_requests_total").increment(1);

    let image = read_image(multipart).await.inspect_err(|e| {
        tracing::warn!(error = %e, "Rejecting analysis request");
    })?;
    tracing::info!(
        image_bytes = image.bytes.len(),
        content_type = ?image.content_type,
        "Processing image"
    );

    let response = state.pipeline.run(&image).await;

    tracing::info!(message = %response.message, "Analysis request completed");
    Ok(Json(response))
}
