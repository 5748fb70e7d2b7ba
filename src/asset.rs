//! Image payloads and edit requests.
//!
//! An [`ImageAsset`] is immutable: it is created when the user picks a file
//! (or when the model returns one) and replaced, never modified. The
//! transport needs it base64-encoded; in-memory handoff uses a `data:` URI;
//! saving decodes back to the exact original bytes.

use crate::error::VisionError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Media type assumed for model output that does not state one.
pub const DEFAULT_MEDIA_TYPE: &str = "image/png";

/// Binary image content with its media type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Vec<u8>,
    media_type: String,
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageAsset {
    /// Wrap bytes with an explicit media type. A blank media type becomes
    /// [`DEFAULT_MEDIA_TYPE`].
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        let media_type = if media_type.trim().is_empty() {
            DEFAULT_MEDIA_TYPE.to_string()
        } else {
            media_type.trim().to_string()
        };
        Self { bytes, media_type }
    }

    /// Load an image file, sniffing the media type from its magic bytes and
    /// falling back to the file extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, VisionError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|_| VisionError::ImageNotFound {
                path: path.to_path_buf(),
            })?;

        let media_type = sniff_media_type(&bytes)
            .or_else(|| media_type_from_extension(path))
            .ok_or_else(|| VisionError::NotAnImage {
                path: path.to_path_buf(),
            })?;

        debug!(
            "Loaded {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            media_type
        );
        Ok(Self::new(bytes, media_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Base64 (standard alphabet, padded) for the request body.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Build from a base64 payload as found in a response part.
    pub fn from_base64(data: &str, media_type: impl Into<String>) -> Result<Self, base64::DecodeError> {
        let bytes = STANDARD.decode(data.trim())?;
        Ok(Self::new(bytes, media_type))
    }

    /// `data:<media-type>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.to_base64())
    }

    /// Parse a base64 `data:` URI. A URI without a media type gets
    /// [`DEFAULT_MEDIA_TYPE`].
    pub fn from_data_uri(uri: &str) -> Result<Self, VisionError> {
        let caps = RE_DATA_URI
            .captures(uri.trim())
            .ok_or_else(|| VisionError::InvalidDataUri("expected data:<type>;base64,<payload>".into()))?;
        let media_type = caps.name("mime").map(|m| m.as_str()).unwrap_or_default();
        Self::from_base64(&caps["data"], media_type)
            .map_err(|e| VisionError::InvalidDataUri(format!("payload is not valid base64: {e}")))
    }

    /// File extension matching the media type, for naming saved output.
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            _ => "png",
        }
    }
}

static RE_DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^data:(?P<mime>[\w.+-]+/[\w.+-]+)?(?:;[\w-]+=[^;,]*)*;base64,(?P<data>.*)$")
        .expect("data URI pattern is valid")
});

/// Media type from the leading bytes, via the `image` crate's format table.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(bytes).ok()?;
    match format {
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        image::ImageFormat::Gif => Some("image/gif"),
        image::ImageFormat::WebP => Some("image/webp"),
        image::ImageFormat::Bmp => Some("image/bmp"),
        image::ImageFormat::Tiff => Some("image/tiff"),
        _ => None,
    }
}

fn media_type_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// An image paired with a non-blank edit instruction.
#[derive(Debug, Clone)]
pub struct EditRequest {
    image: ImageAsset,
    instruction: String,
}

impl EditRequest {
    /// Fails with [`VisionError::EmptyInstruction`] unless `instruction`
    /// contains a non-whitespace character.
    pub fn new(image: ImageAsset, instruction: impl Into<String>) -> Result<Self, VisionError> {
        let instruction = instruction.into();
        if instruction.trim().is_empty() {
            return Err(VisionError::EmptyInstruction);
        }
        Ok(Self { image, instruction })
    }

    pub fn image(&self) -> &ImageAsset {
        &self.image
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 128, 255, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode should succeed");
        buf
    }

    #[test]
    fn sniffs_png() {
        assert_eq!(sniff_media_type(&tiny_png()), Some("image/png"));
        assert_eq!(sniff_media_type(b"not an image"), None);
    }

    #[test]
    fn blank_media_type_defaults_to_png() {
        let a = ImageAsset::new(vec![1, 2, 3], "  ");
        assert_eq!(a.media_type(), "image/png");
    }

    #[test]
    fn data_uri_round_trip() {
        let a = ImageAsset::new(tiny_png(), "image/png");
        let uri = a.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        let back = ImageAsset::from_data_uri(&uri).expect("valid uri");
        assert_eq!(back, a);
    }

    #[test]
    fn data_uri_without_media_type() {
        let a = ImageAsset::from_data_uri("data:;base64,AQID").expect("valid uri");
        assert_eq!(a.bytes(), &[1, 2, 3]);
        assert_eq!(a.media_type(), DEFAULT_MEDIA_TYPE);
    }

    #[test]
    fn data_uri_rejects_garbage() {
        assert!(matches!(
            ImageAsset::from_data_uri("http://example.com/x.png"),
            Err(VisionError::InvalidDataUri(_))
        ));
        assert!(matches!(
            ImageAsset::from_data_uri("data:image/png;base64,@@@"),
            Err(VisionError::InvalidDataUri(_))
        ));
    }

    #[test]
    fn extension_follows_media_type() {
        assert_eq!(ImageAsset::new(vec![], "image/jpeg").extension(), "jpg");
        assert_eq!(ImageAsset::new(vec![], "image/x-unknown").extension(), "png");
    }

    #[test]
    fn edit_request_requires_instruction() {
        let img = ImageAsset::new(vec![0], "image/png");
        assert!(matches!(
            EditRequest::new(img.clone(), " \n\t"),
            Err(VisionError::EmptyInstruction)
        ));
        let req = EditRequest::new(img, "add a hat").expect("valid request");
        assert_eq!(req.instruction(), "add a hat");
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = ImageAsset::from_path("/definitely/not/here.png")
            .await
            .unwrap_err();
        assert!(matches!(err, VisionError::ImageNotFound { .. }));
    }

    #[tokio::test]
    async fn from_path_sniffs_and_rejects() {
        let dir = tempfile::tempdir().expect("tempdir");
        let png = dir.path().join("table.dat");
        std::fs::write(&png, tiny_png()).expect("write");
        let asset = ImageAsset::from_path(&png).await.expect("loads");
        assert_eq!(asset.media_type(), "image/png");

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, b"hello").expect("write");
        assert!(matches!(
            ImageAsset::from_path(&txt).await,
            Err(VisionError::NotAnImage { .. })
        ));
    }
}
