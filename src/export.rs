//! Exporting results: clipboard for extracted text, files for images and CSV.
//!
//! File writes are atomic (temp file in the target directory, then rename) so
//! an interrupted save never leaves a truncated image or half a CSV behind.

use crate::asset::ImageAsset;
use crate::error::VisionError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name used when saving an edited image without an explicit path.
pub const DEFAULT_IMAGE_FILE_NAME: &str = "edited-image.png";

/// Write the asset's bytes, unchanged, to `path`.
pub async fn save_image(asset: &ImageAsset, path: impl AsRef<Path>) -> Result<PathBuf, VisionError> {
    let path = path.as_ref().to_path_buf();
    write_atomic(&path, asset.bytes().to_vec()).await?;
    info!("Saved {} bytes ({}) to {}", asset.bytes().len(), asset.media_type(), path.display());
    Ok(path)
}

/// Decode a `data:` URI and save its bytes to `path`.
pub async fn save_data_uri(uri: &str, path: impl AsRef<Path>) -> Result<PathBuf, VisionError> {
    let asset = ImageAsset::from_data_uri(uri)?;
    save_image(&asset, path).await
}

/// Write extracted text, verbatim, to `path`.
pub async fn write_text(raw: &str, path: impl AsRef<Path>) -> Result<PathBuf, VisionError> {
    let path = path.as_ref().to_path_buf();
    write_atomic(&path, raw.as_bytes().to_vec()).await?;
    info!("Wrote {} chars to {}", raw.len(), path.display());
    Ok(path)
}

async fn write_atomic(path: &Path, contents: Vec<u8>) -> Result<(), VisionError> {
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&target, &contents))
        .await
        .map_err(|e| VisionError::Internal(format!("Write task panicked: {e}")))?
}

fn write_atomic_blocking(path: &Path, contents: &[u8]) -> Result<(), VisionError> {
    let fail = |source: std::io::Error| VisionError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(fail)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(fail)?;
    tmp.write_all(contents).map_err(fail)?;
    tmp.flush().map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    debug!("Persisted {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Put `raw` on the system clipboard exactly as given.
#[cfg(feature = "clipboard")]
pub fn copy_to_clipboard(raw: &str) -> Result<(), VisionError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| VisionError::ClipboardUnavailable(e.to_string()))?;
    clipboard
        .set_text(raw.to_string())
        .map_err(|e| VisionError::ClipboardUnavailable(e.to_string()))?;
    debug!("Copied {} chars to clipboard", raw.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_image_writes_exact_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bytes: Vec<u8> = (0..=255).collect();
        let asset = ImageAsset::new(bytes.clone(), "image/png");
        let path = save_image(&asset, dir.path().join(DEFAULT_IMAGE_FILE_NAME))
            .await
            .expect("saves");
        assert_eq!(std::fs::read(path).expect("reads"), bytes);
    }

    #[tokio::test]
    async fn data_uri_save_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let asset = ImageAsset::new(vec![9, 8, 7, 0, 255], "image/png");
        let path = dir.path().join("nested/out.png");
        save_data_uri(&asset.to_data_uri(), &path).await.expect("saves");
        assert_eq!(std::fs::read(path).expect("reads"), asset.bytes());
    }

    #[tokio::test]
    async fn write_text_is_verbatim_and_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("table.csv");
        write_text("old", &path).await.expect("writes");
        let raw = "a,\"b,c\"\r\n  d ,\n";
        write_text(raw, &path).await.expect("writes");
        assert_eq!(std::fs::read_to_string(&path).expect("reads"), raw);
    }

    #[tokio::test]
    async fn unwritable_target_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").expect("write");
        let err = write_text("a", blocker.join("child.csv")).await.unwrap_err();
        match err {
            VisionError::OutputWriteFailed { path, .. } => assert!(path.ends_with("child.csv")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(feature = "clipboard")]
    #[test]
    fn clipboard_holds_raw_text_verbatim() {
        let Ok(mut clipboard) = arboard::Clipboard::new() else {
            println!("SKIP: no clipboard available (headless session)");
            return;
        };
        let raw = "Name,\"City, State\"\r\nAda,\"London, UK\"\r\n";
        copy_to_clipboard(raw).expect("copies");
        assert_eq!(clipboard.get_text().expect("reads back"), raw);
    }
}
