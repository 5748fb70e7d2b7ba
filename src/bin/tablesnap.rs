//! CLI binary for tablesnap.
//!
//! A thin shim over the library crate that maps CLI flags to `ClientConfig`,
//! runs one action and prints the result.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tablesnap::config::{api_key_from_env, ApiKey};
use tablesnap::export::{self, DEFAULT_IMAGE_FILE_NAME};
use tablesnap::preview::{self, render_grid, Preview};
use tablesnap::{
    ActionSlot, ClientConfig, EditRequest, ImageAsset, RequestOutcome, VisionClient, VisionError,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Table preview in the terminal
  tablesnap extract receipt.jpg

  # Raw CSV to a file and the clipboard
  tablesnap extract --view raw --copy -o receipt.csv receipt.jpg

  # Edit an image (writes edited-image.png)
  tablesnap edit photo.png -i "remove the background"

  # Edit with an explicit output path and model
  tablesnap --model-edit gemini-2.5-flash-image edit photo.png -i "make it sepia" -o sepia.png

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY           Gemini API key (required)
  API_KEY                  Fallback when GEMINI_API_KEY is unset
  TABLESNAP_EXTRACT_MODEL  Override extraction model
  TABLESNAP_EDIT_MODEL     Override edit model
  TABLESNAP_BASE_URL       Override the API endpoint
  RUST_LOG                 Log filter (overrides --verbose/--quiet)
"#;

/// Extract tables from images as CSV, or edit images with an instruction.
#[derive(Parser, Debug)]
#[command(
    name = "tablesnap",
    version,
    about = "Extract tables from images as CSV, or edit images with an instruction",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Model used for table extraction.
    #[arg(long, global = true, env = "TABLESNAP_EXTRACT_MODEL")]
    model_extract: Option<String>,

    /// Model used for image editing.
    #[arg(long, global = true, env = "TABLESNAP_EDIT_MODEL")]
    model_edit: Option<String>,

    /// Generation API base URL.
    #[arg(long, global = true, env = "TABLESNAP_BASE_URL")]
    base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "TABLESNAP_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Disable the spinner.
    #[arg(long, global = true, env = "TABLESNAP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "TABLESNAP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, global = true, env = "TABLESNAP_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the table(s) in an image as CSV.
    Extract {
        /// Image containing a table.
        image: PathBuf,

        /// How to print the result.
        #[arg(long, value_enum, default_value = "table")]
        view: ViewArg,

        /// Also copy the raw CSV to the clipboard.
        #[arg(long)]
        copy: bool,

        /// Write the raw CSV to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print `{ "raw": ..., "tables": [...] }` as JSON instead.
        #[arg(long)]
        json: bool,
    },

    /// Edit an image following a natural-language instruction.
    Edit {
        /// Image to edit.
        image: PathBuf,

        /// What to change, e.g. "add a party hat".
        #[arg(short, long)]
        instruction: String,

        /// Where to save the edited image.
        #[arg(short, long, default_value = DEFAULT_IMAGE_FILE_NAME)]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ViewArg {
    /// Boxed grid per table; raw text when nothing decodes.
    Table,
    /// CSV exactly as returned.
    Raw,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers the only wait; library INFO logs would just
    // interleave with it.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || !cli.no_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Credential check before touching any input ───────────────────────
    let api_key = api_key_from_env();
    let config = build_config(&cli, api_key)?;
    config
        .require_api_key()
        .map_err(|e| anyhow::anyhow!("{}\n{}", red(e.user_message()), dim(&e.to_string())))?;

    let client = VisionClient::gemini(config).context("Failed to initialise client")?;
    let show_progress = !cli.quiet && !cli.no_progress;

    match &cli.command {
        Command::Extract {
            image,
            view,
            copy,
            output,
            json,
        } => {
            let asset = ImageAsset::from_path(image)
                .await
                .with_context(|| format!("Failed to load {}", image.display()))?;

            let raw = run_action(
                "Extracting table…",
                show_progress && !*json,
                client.extract_table(&asset),
            )
            .await?;

            if let Some(path) = output {
                export::write_text(&raw, path)
                    .await
                    .context("Failed to save CSV")?;
                if !cli.quiet {
                    eprintln!("{} CSV saved to {}", green("✔"), path.display());
                }
            }

            if *copy {
                match export::copy_to_clipboard(&raw) {
                    Ok(()) if !cli.quiet => eprintln!("{} CSV copied to clipboard", green("✔")),
                    Ok(()) => {}
                    Err(e) => eprintln!("{} {}", yellow("⚠"), e),
                }
            }

            if *json {
                print_json(&raw)?;
            } else {
                print_extraction(&mut io::stdout().lock(), &raw, *view, cli.quiet)?;
            }
        }

        Command::Edit {
            image,
            instruction,
            output,
        } => {
            let asset = ImageAsset::from_path(image)
                .await
                .with_context(|| format!("Failed to load {}", image.display()))?;
            let request = EditRequest::new(asset, instruction.as_str())
                .map_err(|e| anyhow::anyhow!("{}", red(&e.to_string())))?;

            let edited = run_action("Editing image…", show_progress, client.edit_image(&request)).await?;

            let path = export::save_image(&edited, output)
                .await
                .context("Failed to save edited image")?;
            if !cli.quiet {
                eprintln!(
                    "{} Edited image saved to {}  {}",
                    green("✔"),
                    path.display(),
                    dim(&format!("{} bytes, {}", edited.bytes().len(), edited.media_type())),
                );
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli, api_key: Option<ApiKey>) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder()
        .api_key_opt(api_key)
        .timeout_secs(cli.timeout);

    if let Some(ref m) = cli.model_extract {
        builder = builder.extraction_model(m);
    }
    if let Some(ref m) = cli.model_edit {
        builder = builder.edit_model(m);
    }
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url);
    }

    builder.build().context("Invalid configuration")
}

/// Run one action through an `ActionSlot`, with a spinner while pending,
/// and turn a failure into its user-facing message.
async fn run_action<T>(
    label: &str,
    show_progress: bool,
    action: impl Future<Output = Result<T, VisionError>>,
) -> Result<T> {
    let mut slot = ActionSlot::new();
    let ticket = slot
        .begin()
        .context("Another request is already in flight")?;

    let spinner = show_progress.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = action.await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    slot.resolve(ticket, result);
    match slot.take_finished() {
        Some(RequestOutcome::Success(value)) => Ok(value),
        Some(RequestOutcome::Failure(failure)) => {
            bail!("{}\n{}", red(&failure.message), dim(&failure.detail))
        }
        Some(RequestOutcome::Pending) | None => bail!("Request did not complete"),
    }
}

fn print_extraction(out: &mut impl Write, raw: &str, view: ViewArg, quiet: bool) -> Result<()> {
    if view == ViewArg::Raw {
        out.write_all(raw.as_bytes())
            .context("Failed to write to stdout")?;
        if !raw.is_empty() && !raw.ends_with('\n') {
            out.write_all(b"\n")
                .context("Failed to write to stdout")?;
        }
        return Ok(());
    }

    match preview::preview(raw) {
        Preview::Empty => {
            if !quiet {
                eprintln!("{} No data was extracted from the image", yellow("⚠"));
            }
        }
        Preview::RawFallback(text) => {
            if !quiet {
                eprintln!(
                    "{} Could not parse table data; showing raw CSV",
                    yellow("⚠")
                );
            }
            writeln!(out, "{text}").context("Failed to write to stdout")?;
        }
        Preview::Tables(tables) => {
            for (i, table) in tables.iter().enumerate() {
                if i > 0 {
                    writeln!(out).context("Failed to write to stdout")?;
                }
                out.write_all(render_grid(table).as_bytes())
                    .context("Failed to write to stdout")?;
            }
            if !quiet {
                let rows: usize = tables.iter().map(|t| t.len()).sum();
                eprintln!(
                    "{}",
                    dim(&format!("{} table(s), {} row(s)", tables.len(), rows))
                );
            }
        }
    }
    Ok(())
}

fn print_json(raw: &str) -> Result<()> {
    let tables: Vec<Vec<Vec<String>>> = tablesnap::decode_tables(raw)
        .into_iter()
        .map(|t| t.into_rows())
        .collect();
    let value = serde_json::json!({ "raw": raw, "tables": tables });
    println!(
        "{}",
        serde_json::to_string_pretty(&value).context("Failed to serialise output")?
    );
    Ok(())
}
