//! Edit requests against the fal.ai flux-2 klein edit endpoints.

use crate::error::{sanitize_error_message, FalEditError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Base edit endpoint (no style adapter). Subscribe semantics: the POST is
/// held open until the queued job completes.
pub const EDIT_ENDPOINT: &str =
    "https://api.fal.ai/subscriptions/fal-ai/flux-2/klein/9b/base/edit";

/// LoRA-capable edit endpoint, used whenever a style adapter is supplied.
pub const EDIT_LORA_ENDPOINT: &str =
    "https://api.fal.ai/subscriptions/fal-ai/flux-2/klein/9b/base/edit/lora";

/// An edit request for one already-uploaded source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    /// Remote URL of the uploaded source image.
    pub source_url: String,
    /// Text prompt describing the edit.
    pub prompt: String,
    /// Optional LoRA reference; `None` selects the base endpoint.
    pub lora: Option<String>,
    /// Natural pixel width of the source image.
    pub width: u32,
    /// Natural pixel height of the source image.
    pub height: u32,
}

impl EditRequest {
    /// Creates a request preserving the source's natural dimensions.
    pub fn new(
        source_url: impl Into<String>,
        prompt: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            prompt: prompt.into(),
            lora: None,
            width,
            height,
        }
    }

    /// Sets the LoRA reference. An empty string is treated as absent.
    pub fn with_lora(mut self, lora: impl Into<String>) -> Self {
        let lora = lora.into();
        self.lora = (!lora.is_empty()).then_some(lora);
        self
    }

    /// Endpoint this request will be submitted to.
    pub fn endpoint(&self) -> &'static str {
        if self.lora.is_some() {
            EDIT_LORA_ENDPOINT
        } else {
            EDIT_ENDPOINT
        }
    }
}

/// One generated image reference in an edit response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditImage {
    /// Remote URL of the generated image.
    pub url: String,
}

/// A completed edit: generated image URLs plus the seed the service used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditOutput {
    /// Generated images, in service order.
    pub images: Vec<EditImage>,
    /// Seed reported by the service, if any.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Submits edit jobs and awaits their completion.
#[async_trait]
pub trait Editor: Send + Sync {
    /// Runs one edit job to completion.
    async fn edit(&self, request: &EditRequest) -> Result<EditOutput>;
}

/// HTTP client for the fal.ai edit endpoints.
pub struct EditClient {
    client: reqwest::Client,
    api_key: String,
}

impl EditClient {
    /// Creates a client authenticating with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    fn parse_error(&self, status: u16, text: &str) -> FalEditError {
        let text = sanitize_error_message(text);
        if let Ok(error_resp) = serde_json::from_str::<ApiErrorResponse>(&text) {
            return FalEditError::Edit {
                status,
                message: sanitize_error_message(&error_resp.detail),
            };
        }
        FalEditError::Edit {
            status,
            message: text,
        }
    }
}

#[async_trait]
impl Editor for EditClient {
    async fn edit(&self, request: &EditRequest) -> Result<EditOutput> {
        let endpoint = request.endpoint();
        let body = EditRequestBody::from_request(request);

        tracing::debug!(endpoint, source = %request.source_url, "submitting edit job");
        let response = self
            .client
            .post(endpoint)
            .header("Authorization", format!("Key {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text));
        }

        let envelope: EditResponseEnvelope = response.json().await?;
        let output = envelope.into_output();
        tracing::debug!(
            images = output.images.len(),
            seed = ?output.seed,
            "edit job complete"
        );
        Ok(output)
    }
}

// -- Request body --

#[derive(Debug, Serialize)]
struct ImageSize {
    width: u32,
    height: u32,
}

#[derive(Debug, Serialize)]
struct LoraWeight {
    path: String,
    scale: u32,
}

#[derive(Debug, Serialize)]
struct EditRequestBody {
    prompt: String,
    guidance_scale: u32,
    num_inference_steps: u32,
    image_size: ImageSize,
    num_images: u32,
    acceleration: &'static str,
    enable_safety_checker: bool,
    output_format: &'static str,
    image_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    loras: Option<Vec<LoraWeight>>,
}

impl EditRequestBody {
    fn from_request(req: &EditRequest) -> Self {
        Self {
            prompt: req.prompt.clone(),
            guidance_scale: 5,
            num_inference_steps: 28,
            image_size: ImageSize {
                width: req.width,
                height: req.height,
            },
            num_images: 1,
            acceleration: "regular",
            enable_safety_checker: false,
            output_format: "png",
            image_urls: vec![req.source_url.clone()],
            loras: req.lora.as_ref().map(|path| {
                vec![LoraWeight {
                    path: path.clone(),
                    scale: 1,
                }]
            }),
        }
    }
}

// -- Response body --

/// The service answers either with the output directly or wrapped in an outer
/// `data` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EditResponseEnvelope {
    Wrapped { data: EditOutput },
    Direct(EditOutput),
}

impl EditResponseEnvelope {
    fn into_output(self) -> EditOutput {
        match self {
            Self::Wrapped { data } => data,
            Self::Direct(output) => output,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    detail: String,
}
