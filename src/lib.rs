//! # tablesnap
//!
//! Turn a photo of a table into CSV, or edit an image with a plain-language
//! instruction, using Gemini vision models.
//!
//! ## Flow Overview
//!
//! ```text
//! image file
//!  │
//!  ├─ 1. Load     read bytes, sniff media type          (asset)
//!  ├─ 2. Request  base64 + fixed prompt / instruction   (client)
//!  ├─ 3. Call     one generateContent round-trip        (transport)
//!  ├─ 4a. CSV     raw text → tables for preview         (table, preview)
//!  ├─ 4b. Image   first inline image part → ImageAsset  (client)
//!  └─ 5. Export   clipboard / file                      (export)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tablesnap::{table, ClientConfig, ImageAsset, VisionClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential from GEMINI_API_KEY (or API_KEY)
//!     let client = VisionClient::gemini(ClientConfig::from_env())?;
//!     let image = ImageAsset::from_path("invoice.png").await?;
//!     let csv = client.extract_table(&image).await?;
//!     for row in table::decode(&csv).rows() {
//!         println!("{}", row.join(" | "));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature     | Default | Description |
//! |-------------|---------|-------------|
//! | `cli`       | on      | Enables the `tablesnap` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `clipboard` | via cli | [`export::copy_to_clipboard`] through arboard |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod asset;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod outcome;
pub mod preview;
pub mod prompts;
pub mod table;
pub mod transport;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use asset::{EditRequest, ImageAsset};
pub use client::VisionClient;
pub use config::{ApiKey, ClientConfig, ClientConfigBuilder};
pub use error::{ErrorKind, VisionError};
pub use outcome::{ActionFailure, ActionSlot, RequestOutcome, RequestTicket};
pub use preview::Preview;
pub use table::{decode, decode_tables, Table};
pub use transport::{GeminiTransport, GenerationTransport, ScriptedTransport};
