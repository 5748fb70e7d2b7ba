//! Generation request facade.
//!
//! [`VisionClient`] is the only code that knows how a table extraction or an
//! image edit is phrased as a generation request, and how the answer is read
//! back. Everything above it deals in [`ImageAsset`], [`EditRequest`] and raw
//! CSV text.
//!
//! ## Call contract
//!
//! - The credential is checked first. A missing key is a
//!   [`VisionError::MissingCredential`] and the transport is never touched.
//! - Exactly one transport call per operation. No retry: a failure is
//!   reported once and the user decides whether to try again.
//! - The client holds no mutable state. Concurrent calls are independent and
//!   may complete in any order; callers that care about staleness tag their
//!   requests (see [`crate::outcome::ActionSlot`]).

use crate::asset::{EditRequest, ImageAsset, DEFAULT_MEDIA_TYPE};
use crate::config::ClientConfig;
use crate::error::VisionError;
use crate::prompts::CSV_EXTRACTION_PROMPT;
use crate::transport::{
    GeminiTransport, GenerateRequest, GenerateResponse, GenerationTransport, RequestPart,
};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Facade over a [`GenerationTransport`].
#[derive(Clone)]
pub struct VisionClient {
    config: ClientConfig,
    transport: Arc<dyn GenerationTransport>,
}

impl fmt::Debug for VisionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionClient")
            .field("config", &self.config)
            .field("transport", &"<dyn GenerationTransport>")
            .finish()
    }
}

impl VisionClient {
    /// Client over an explicit transport.
    pub fn new(config: ClientConfig, transport: Arc<dyn GenerationTransport>) -> Self {
        Self { config, transport }
    }

    /// Client over the real Gemini transport.
    pub fn gemini(config: ClientConfig) -> Result<Self, VisionError> {
        let transport = GeminiTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Extract the table(s) in `image` as CSV text.
    ///
    /// The text is returned exactly as the model produced it, possibly empty.
    /// Decoding is the caller's business ([`crate::table::decode`]).
    ///
    /// # Errors
    /// - [`VisionError::MissingCredential`] before any network activity
    /// - any transport error, unchanged
    /// - [`VisionError::MalformedResponse`] when the answer holds no text part
    pub async fn extract_table(&self, image: &ImageAsset) -> Result<String, VisionError> {
        let credential = self.config.require_api_key()?;
        let model = &self.config.extraction_model;
        let start = Instant::now();
        info!(
            "Extracting table with {} ({} bytes, {})",
            model,
            image.bytes().len(),
            image.media_type()
        );

        let request = GenerateRequest {
            model: model.clone(),
            parts: vec![inline_part(image), RequestPart::Text(CSV_EXTRACTION_PROMPT.to_string())],
        };

        let response = self
            .transport
            .generate(credential, request)
            .await
            .inspect_err(|e| warn!("Extraction failed: {}", e))?;

        let text = response
            .first_candidate_text()
            .ok_or_else(|| VisionError::MalformedResponse {
                detail: "response carried no text".into(),
            })?;

        info!(
            "Extraction complete: {} chars in {:?}",
            text.len(),
            start.elapsed()
        );
        Ok(text)
    }

    /// Apply the instruction in `request` to its image.
    ///
    /// Returns the first inline image found in the response. Its media type
    /// is the one the service stated, or `image/png` when none was given.
    ///
    /// # Errors
    /// - [`VisionError::MissingCredential`] before any network activity
    /// - any transport error, unchanged
    /// - [`VisionError::NoImageReturned`] when no part carries image data
    /// - [`VisionError::MalformedResponse`] when the image payload is not
    ///   valid base64
    pub async fn edit_image(&self, request: &EditRequest) -> Result<ImageAsset, VisionError> {
        let credential = self.config.require_api_key()?;
        let model = &self.config.edit_model;
        let start = Instant::now();
        info!(
            "Editing image with {} ({} bytes, {} chars of instruction)",
            model,
            request.image().bytes().len(),
            request.instruction().len()
        );

        let generate = GenerateRequest {
            model: model.clone(),
            parts: vec![
                inline_part(request.image()),
                RequestPart::Text(request.instruction().to_string()),
            ],
        };

        let response = self
            .transport
            .generate(credential, generate)
            .await
            .inspect_err(|e| warn!("Edit failed: {}", e))?;

        let asset = first_image(&response).ok_or_else(|| {
            warn!("Edit response from {} held no image", model);
            VisionError::NoImageReturned {
                model: model.clone(),
            }
        })??;

        info!(
            "Edit complete: {} bytes ({}) in {:?}",
            asset.bytes().len(),
            asset.media_type(),
            start.elapsed()
        );
        Ok(asset)
    }
}

fn inline_part(image: &ImageAsset) -> RequestPart {
    let data_base64 = image.to_base64();
    debug!("Encoded image → {} bytes base64", data_base64.len());
    RequestPart::InlineImage {
        media_type: image.media_type().to_string(),
        data_base64,
    }
}

/// First part with non-empty inline data, decoded. `None` when there is no
/// such part; `Some(Err)` when its payload does not decode.
fn first_image(response: &GenerateResponse) -> Option<Result<ImageAsset, VisionError>> {
    let inline = response
        .parts()
        .filter_map(|p| p.inline_data.as_ref())
        .find(|d| !d.data.trim().is_empty())?;

    let media_type = inline
        .mime_type
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(DEFAULT_MEDIA_TYPE);

    Some(
        ImageAsset::from_base64(&inline.data, media_type).map_err(|e| {
            VisionError::MalformedResponse {
                detail: format!("inline image is not valid base64: {e}"),
            }
        }),
    )
}
