//! Hugging Face Inference API provider.
//!
//! Talks to the hosted text-generation endpoint of a single model:
//!
//! ```text
//! POST https://api-inference.huggingface.co/models/<owner>/<model>
//! {"inputs": "...", "parameters": {"max_length": 100, "temperature": 0.7, ...}}
//! → [{"generated_text": "..."}]
//! ```
//!
//! The endpoint echoes the prompt at the start of `generated_text`; it is
//! stripped before the text is handed back.

use async_trait::async_trait;
use chatbridge_core::error::ProviderError;
use chatbridge_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A provider bound to one Hugging Face model endpoint.
pub struct HuggingFaceProvider {
    name: String,
    url: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl HuggingFaceProvider {
    /// Create a provider for `url` with a 10 second client timeout.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        api_token: Option<String>,
    ) -> Result<Self, ProviderError> {
        Self::with_timeout(name, url, api_token, Duration::from_secs(10))
    }

    /// Create a provider whose HTTP client gives up after `timeout`.
    pub fn with_timeout(
        name: impl Into<String>,
        url: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            url: url.into(),
            api_token,
            client,
        })
    }

    /// The endpoint this provider posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(request: &GenerationRequest) -> ApiRequest<'_> {
        ApiRequest {
            inputs: &request.prompt,
            parameters: ApiParameters {
                max_length: request.params.max_length,
                temperature: request.params.temperature,
                do_sample: request.params.do_sample,
                top_p: request.params.top_p,
            },
        }
    }
}

/// Pull the continuation out of a raw response body.
///
/// Takes the first element's `generated_text`, removes every occurrence of
/// the prompt, and trims. Anything that is not a non-empty JSON array is a
/// malformed payload; a blank continuation is [`ProviderError::EmptyOutput`].
pub fn extract_generated_text(body: &str, prompt: &str) -> Result<String, ProviderError> {
    let items: Vec<ApiGeneration> = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedPayload(format!("expected a JSON array: {e}")))?;

    let first = items
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::MalformedPayload("empty result array".into()))?;

    let generated = first.generated_text.unwrap_or_default();
    let text = generated.replace(prompt, "").trim().to_string();

    if text.is_empty() {
        return Err(ProviderError::EmptyOutput);
    }

    Ok(text)
}

#[async_trait]
impl chatbridge_core::Provider for HuggingFaceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError> {
        debug!(provider = %self.name, url = %self.url, "Sending generation request");

        let mut builder = self
            .client
            .post(&self.url)
            .json(&Self::request_body(&request));

        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let text = extract_generated_text(&body, &request.prompt)?;

        Ok(GenerationResponse {
            text,
            model: self.name.clone(),
        })
    }
}

// --- API wire types ---

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    inputs: &'a str,
    parameters: ApiParameters,
}

#[derive(Debug, Serialize)]
struct ApiParameters {
    max_length: u32,
    temperature: f32,
    do_sample: bool,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct ApiGeneration {
    #[serde(default)]
    generated_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use chatbridge_core::Provider;
    use std::sync::{Arc, Mutex};

    const PROMPT: &str = "ユーザー: 映画は好き？\nAI: ";

    #[test]
    fn request_body_shape() {
        let request = GenerationRequest::new(PROMPT, GenerationParams::default());
        let body = serde_json::to_value(HuggingFaceProvider::request_body(&request)).unwrap();
        assert_eq!(body["inputs"], PROMPT);
        assert_eq!(body["parameters"]["max_length"], 100);
        assert_eq!(body["parameters"]["do_sample"], true);
        let temperature = body["parameters"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        let top_p = body["parameters"]["top_p"].as_f64().unwrap();
        assert!((top_p - 0.9).abs() < 1e-6);
    }

    #[test]
    fn extract_strips_echoed_prompt() {
        let body = format!(r#"[{{"generated_text":"{}はい、大好きです。"}}]"#, "ユーザー: 映画は好き？\\nAI: ");
        let text = extract_generated_text(&body, PROMPT).unwrap();
        assert_eq!(text, "はい、大好きです。");
    }

    #[test]
    fn extract_rejects_object_payload() {
        let body = r#"{"error":"Model is currently loading","estimated_time":20.0}"#;
        assert!(matches!(
            extract_generated_text(body, PROMPT),
            Err(ProviderError::MalformedPayload(_))
        ));
    }

    #[test]
    fn extract_rejects_empty_array() {
        assert!(matches!(
            extract_generated_text("[]", PROMPT),
            Err(ProviderError::MalformedPayload(_))
        ));
    }

    #[test]
    fn extract_prompt_only_is_empty_output() {
        let body = r#"[{"generated_text":"ユーザー: 映画は好き？\nAI:    "}]"#;
        assert!(matches!(
            extract_generated_text(body, PROMPT),
            Err(ProviderError::EmptyOutput)
        ));
    }

    #[test]
    fn extract_missing_field_is_empty_output() {
        assert!(matches!(
            extract_generated_text(r#"[{"score":0.4}]"#, PROMPT),
            Err(ProviderError::EmptyOutput)
        ));
    }

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn generate_against_local_endpoint() {
        let seen_auth = Arc::new(Mutex::new(None::<String>));
        let seen = seen_auth.clone();
        let router = Router::new().route(
            "/models/test",
            post(move |headers: HeaderMap, Json(body): Json<serde_json::Value>| {
                let seen = seen.clone();
                async move {
                    *seen.lock().unwrap() = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    let prompt = body["inputs"].as_str().unwrap_or_default().to_string();
                    Json(serde_json::json!([{ "generated_text": format!("{prompt}そうですね。") }]))
                }
            }),
        );
        let base = serve(router).await;

        let provider =
            HuggingFaceProvider::new("local", format!("{base}/models/test"), Some("hf_t".into()))
                .unwrap();
        let response = provider
            .generate(GenerationRequest::new(PROMPT, GenerationParams::default()))
            .await
            .unwrap();

        assert_eq!(response.text, "そうですね。");
        assert_eq!(response.model, "local");
        assert_eq!(seen_auth.lock().unwrap().as_deref(), Some("Bearer hf_t"));
    }

    #[tokio::test]
    async fn non_200_is_api_error() {
        let router = Router::new().route(
            "/models/test",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "loading") }),
        );
        let base = serve(router).await;

        let provider = HuggingFaceProvider::new("local", format!("{base}/models/test"), None).unwrap();
        let err = provider
            .generate(GenerationRequest::new(PROMPT, GenerationParams::default()))
            .await
            .unwrap_err();

        match err {
            ProviderError::ApiError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 503);
                assert_eq!(message, "loading");
            }
            other => panic!("Expected ApiError, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = HuggingFaceProvider::new("gone", format!("http://{addr}/models/x"), None).unwrap();
        let err = provider
            .generate(GenerationRequest::new(PROMPT, GenerationParams::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_) | ProviderError::Timeout(_)));
    }
}
