use mime::Mime;
use serde::{Deserialize, Serialize};

/// Label used in place of the classifier output when classification fails.
pub const FALLBACK_CATEGORY: &str = "general waste";

const UNAVAILABLE: &str = "Analysis unavailable";
const UNKNOWN: &str = "Unknown";

/// Uploaded image as received on the inbound request.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        let mime_type = normalize_image_mime(content_type.as_deref());
        Self {
            bytes,
            content_type,
            mime_type,
        }
    }

    /// MIME type to tag the image with on outbound calls.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

/// Reduces a declared content type to its `image/*` essence. Anything that
/// does not parse, or is not an image type, is sent as JPEG.
fn normalize_image_mime(declared: Option<&str>) -> String {
    declared
        .and_then(|ct| ct.parse::<Mime>().ok())
        .filter(|parsed| parsed.type_() == mime::IMAGE)
        .map(|parsed| parsed.essence_str().to_string())
        .unwrap_or_else(|| mime::IMAGE_JPEG.essence_str().to_string())
}

/// Body returned by the classification service.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resalability {
    pub is_resalable: bool,
    pub platforms: Vec<String>,
    pub condition: String,
    pub value: String,
    pub tips: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recyclability {
    pub is_recyclable: bool,
    pub centers: Vec<String>,
    pub material: String,
    pub process: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reusability {
    pub is_reusable: bool,
    pub ways: Vec<String>,
    pub durability: String,
    pub benefits: String,
    pub tutorial: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarbonFootprint {
    pub production: String,
    pub usage: String,
    pub disposal: String,
    pub total_estimate: String,
    pub reduction_tips: Vec<String>,
}

/// Sustainability assessment of a single item.
///
/// Every field is required when deserializing; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub resalable: Resalability,
    pub recyclable: Recyclability,
    pub reusable: Reusability,
    pub carbon_footprint: CarbonFootprint,
    pub biodegradable: bool,
    pub time_to_degrade: String,
    pub description: String,
}

impl AnalysisResult {
    /// The fixed result returned when the generative analysis fails.
    pub fn unavailable() -> Self {
        Self {
            resalable: Resalability {
                is_resalable: false,
                platforms: vec![UNAVAILABLE.to_string()],
                condition: UNKNOWN.to_string(),
                value: UNKNOWN.to_string(),
                tips: UNAVAILABLE.to_string(),
            },
            recyclable: Recyclability {
                is_recyclable: false,
                centers: vec!["Please check local centers".to_string()],
                material: UNKNOWN.to_string(),
                process: UNKNOWN.to_string(),
                impact: UNKNOWN.to_string(),
            },
            reusable: Reusability {
                is_reusable: false,
                ways: vec![UNAVAILABLE.to_string()],
                durability: UNKNOWN.to_string(),
                benefits: UNKNOWN.to_string(),
                tutorial: UNAVAILABLE.to_string(),
            },
            carbon_footprint: CarbonFootprint {
                production: UNKNOWN.to_string(),
                usage: UNKNOWN.to_string(),
                disposal: UNKNOWN.to_string(),
                total_estimate: UNKNOWN.to_string(),
                reduction_tips: vec![UNAVAILABLE.to_string()],
            },
            biodegradable: false,
            time_to_degrade: UNKNOWN.to_string(),
            description: UNAVAILABLE.to_string(),
        }
    }
}

/// Response body of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub message: String,
    pub analysis: AnalysisResult,
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
