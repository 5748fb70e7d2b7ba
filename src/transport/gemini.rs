//! Gemini `generateContent` over HTTPS.
//!
//! One POST per call, no retry. The API key travels in the
//! `x-goog-api-key` header rather than the query string so it never lands in
//! proxy or server access logs.

use super::{GenerateRequest, GenerateResponse, GenerationTransport, RequestPart};
use crate::config::{ApiKey, ClientConfig};
use crate::error::VisionError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Longest error body carried into [`VisionError::ApiError`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct WireRequest<'a> {
    contents: Vec<WireContent<'a>>,
}

#[derive(Serialize)]
struct WireContent<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: WireInline<'a>,
    },
}

#[derive(Serialize)]
struct WireInline<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: &'a str,
}

impl<'a> WireRequest<'a> {
    fn from_request(request: &'a GenerateRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|p| match p {
                RequestPart::Text(text) => WirePart::Text { text },
                RequestPart::InlineImage {
                    media_type,
                    data_base64,
                } => WirePart::Inline {
                    inline_data: WireInline {
                        mime_type: media_type,
                        data: data_base64,
                    },
                },
            })
            .collect();
        Self {
            contents: vec![WireContent { role: "user", parts }],
        }
    }
}

/// Real network transport.
#[derive(Debug, Clone)]
pub struct GeminiTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl GeminiTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, VisionError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VisionError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.trim().trim_start_matches("models/");
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationTransport for GeminiTransport {
    async fn generate(
        &self,
        credential: &ApiKey,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, VisionError> {
        let url = self.endpoint(&request.model);
        let body = WireRequest::from_request(&request);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VisionError::ApiTimeout {
                        elapsed_ms: start.elapsed().as_millis() as u64,
                    }
                } else {
                    VisionError::ApiError {
                        status: None,
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        debug!("{} → HTTP {} in {:?}", request.model, status, start.elapsed());

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            warn!("{} failed with HTTP {}", request.model, status);
            return Err(map_status(status, retry_after, &text));
        }

        response.json::<GenerateResponse>().await.map_err(|e| {
            if e.is_timeout() {
                VisionError::ApiTimeout {
                    elapsed_ms: self.timeout.as_millis() as u64,
                }
            } else {
                VisionError::MalformedResponse {
                    detail: e.to_string(),
                }
            }
        })
    }
}

fn map_status(status: StatusCode, retry_after_secs: Option<u64>, body: &str) -> VisionError {
    let detail = truncate(body.trim(), MAX_ERROR_BODY);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VisionError::AuthError { detail },
        StatusCode::TOO_MANY_REQUESTS => VisionError::RateLimited { retry_after_secs },
        _ => VisionError::ApiError {
            status: Some(status.as_u16()),
            message: detail,
        },
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\u{2026}", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_body_shape() {
        let req = GenerateRequest {
            model: "gemini-2.5-flash".into(),
            parts: vec![
                RequestPart::InlineImage {
                    media_type: "image/png".into(),
                    data_base64: "AQID".into(),
                },
                RequestPart::Text("extract".into()),
            ],
        };
        let json = serde_json::to_value(WireRequest::from_request(&req)).expect("serialises");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["data"], "AQID");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "extract");
    }

    #[test]
    fn endpoint_strips_models_prefix() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:9/v1beta/")
            .build()
            .unwrap();
        let t = GeminiTransport::new(&config).unwrap();
        assert_eq!(
            t.endpoint("models/gemini-2.5-flash"),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            map_status(StatusCode::UNAUTHORIZED, None, "bad key"),
            VisionError::AuthError { .. }
        ));
        assert!(matches!(
            map_status(StatusCode::TOO_MANY_REQUESTS, Some(7), ""),
            VisionError::RateLimited {
                retry_after_secs: Some(7)
            }
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_GATEWAY, None, "oops"),
            VisionError::ApiError {
                status: Some(502),
                ..
            }
        ));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "ééééé";
        let t = truncate(s, 3);
        assert!(t.starts_with('é'));
        assert!(t.ends_with('\u{2026}'));
        assert_eq!(truncate("short", 10), "short");
    }

    #[tokio::test]
    async fn unreachable_host_is_service_error() {
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:1")
            .timeout_secs(2)
            .build()
            .unwrap();
        let t = GeminiTransport::new(&config).unwrap();
        let key = ApiKey::new("k").unwrap();
        let err = t
            .generate(
                &key,
                GenerateRequest {
                    model: "m".into(),
                    parts: vec![],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Service);
    }
}
