use std::sync::Arc;

use image::imageops::FilterType;
use uuid::Uuid;

use crate::error::ValidationError;

/// Extensions offered in the file dialog.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Longest preview side in pixels.
pub const PREVIEW_MAX_SIDE: u32 = 512;

/// A user-supplied image held as raw bytes for submission.
///
/// Uploaded files and promoted AI candidates both go through [`ImageFile::new`],
/// so a confirmed candidate is indistinguishable from uploading the same bytes.
#[derive(Clone, Debug)]
pub struct ImageFile {
    /// Unique per selection, used for texture names.
    pub id: Uuid,
    pub name: String,
    pub mime: &'static str,
    bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> ImageFile {
        let bytes = bytes.into();
        let name = name.into();
        let mime = sniff_mime(&bytes, &name);
        ImageFile {
            id: Uuid::new_v4(),
            name,
            mime,
            bytes,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Same bytes, name and mime, regardless of selection id.
    pub fn same_content(&self, other: &ImageFile) -> bool {
        self.name == other.name && self.mime == other.mime && self.bytes == other.bytes
    }
}

fn sniff_mime(bytes: &[u8], name: &str) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    let ext = name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Decoded RGBA pixels ready to upload as a texture.
#[derive(Clone, Debug)]
pub struct ImagePreview {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImagePreview {
    /// Decode locally, no network involved. Large images are downscaled.
    pub fn decode(file: &ImageFile) -> Result<ImagePreview, ValidationError> {
        let img = image::load_from_memory(file.bytes())
            .map_err(|e| ValidationError::UnreadableImage(e.to_string()))?;
        let rgba = ensure_reasonable_size(img.to_rgba8());
        Ok(ImagePreview {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }
}

fn ensure_reasonable_size(img: image::RgbaImage) -> image::RgbaImage {
    let (w, h) = img.dimensions();
    if w <= PREVIEW_MAX_SIDE && h <= PREVIEW_MAX_SIDE {
        return img;
    }
    let scale = (PREVIEW_MAX_SIDE as f32 / w as f32).min(PREVIEW_MAX_SIDE as f32 / h as f32);
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);

    image::imageops::resize(&img, new_w, new_h, FilterType::Triangle)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 40, 40, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn mime_is_sniffed_from_content() {
        let file = ImageFile::new("photo.jpg", png_bytes(2, 2));
        assert_eq!(file.mime, "image/png");
    }

    #[test]
    fn mime_falls_back_to_extension() {
        let file = ImageFile::new("photo.webp", vec![0u8; 4]);
        assert_eq!(file.mime, "image/webp");
    }

    #[test]
    fn large_previews_are_downscaled() {
        let file = ImageFile::new("big.png", png_bytes(1024, 256));
        let preview = ImagePreview::decode(&file).unwrap();
        assert_eq!((preview.width, preview.height), (512, 128));
        assert_eq!(preview.rgba.len(), 512 * 128 * 4);
    }

    #[test]
    fn garbage_does_not_decode() {
        let file = ImageFile::new("notes.png", b"not an image".to_vec());
        assert!(matches!(
            ImagePreview::decode(&file),
            Err(ValidationError::UnreadableImage(_))
        ));
    }

    #[test]
    fn same_content_ignores_selection_id() {
        let a = ImageFile::new("m.png", png_bytes(3, 3));
        let b = ImageFile::new("m.png", png_bytes(3, 3));
        assert_ne!(a.id, b.id);
        assert!(a.same_content(&b));
    }
}
