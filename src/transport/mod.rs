//! Transport seam between the facade and the generation API.
//!
//! [`crate::client::VisionClient`] builds a [`GenerateRequest`] and hands it to
//! whatever [`GenerationTransport`] it was constructed with. Two
//! implementations ship with the crate:
//!
//! ```text
//! VisionClient ──▶ dyn GenerationTransport ──┬─▶ GeminiTransport   (reqwest → generateContent)
//!                                            └─▶ ScriptedTransport (queued replies, call log)
//! ```
//!
//! 1. [`gemini`]:   the real network client; the only code with HTTP I/O
//! 2. [`scripted`]: replays canned responses and records every request, so
//!    facade logic can be exercised without a network
//!
//! The wire types mirror the Gemini REST shape closely enough to serialise
//! straight into a request body and deserialise straight out of a response.

pub mod gemini;
pub mod scripted;

use crate::config::ApiKey;
use crate::error::VisionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiTransport;
pub use scripted::ScriptedTransport;

/// One generation call: a model and an ordered list of input parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub model: String,
    pub parts: Vec<RequestPart>,
}

/// A single input part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart {
    Text(String),
    InlineImage {
        media_type: String,
        data_base64: String,
    },
}

impl GenerateRequest {
    /// Text of every text part, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            RequestPart::Text(t) => Some(t.as_str()),
            RequestPart::InlineImage { .. } => None,
        })
    }
}

/// Response body: zero or more candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part carries text, inline binary data, or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        rename = "inlineData",
        alias = "inline_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(default, rename = "mimeType", alias = "mime_type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

impl ResponsePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn inline(mime_type: Option<&str>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.map(str::to_string),
                data: data.into(),
            }),
        }
    }
}

impl GenerateResponse {
    /// A response with one candidate holding `parts`.
    pub fn from_parts(parts: Vec<ResponsePart>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(CandidateContent { parts }),
            }],
        }
    }

    /// Parts of every candidate, in order.
    pub fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// Concatenated text of the first candidate, or `None` when it has no
    /// text part at all. An empty string is a real answer.
    pub fn first_candidate_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let mut texts = parts.iter().filter_map(|p| p.text.as_deref()).peekable();
        texts.peek()?;
        Some(texts.collect())
    }
}

/// Performs one generation round-trip.
///
/// Implementations must not retry and must not share mutable state between
/// calls beyond what they need for their own bookkeeping.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(
        &self,
        credential: &ApiKey,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, VisionError>;
}
