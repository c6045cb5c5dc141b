use crate::{AssetError, AssetId, TextureSource};
use sha2::{Digest, Sha256};

/// Largest width or height accepted for a color map. Matches the 2D texture
/// limit every wgpu device guarantees.
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;

/// A decoded texture ready for upload: tightly packed RGBA8 rows.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureData {
    pub id: AssetId,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl std::fmt::Debug for TextureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureData")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl TextureData {
    /// Decode an encoded image (PNG or JPEG) into RGBA8.
    ///
    /// Images wider or taller than [`MAX_TEXTURE_DIMENSION`] are rejected
    /// before the pixels are expanded.
    pub fn decode(label: impl Into<String>, bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)?;
        let (width, height) = (img.width(), img.height());
        if width == 0 || height == 0 {
            return Err(AssetError::EmptyImage);
        }
        if width > MAX_TEXTURE_DIMENSION || height > MAX_TEXTURE_DIMENSION {
            return Err(AssetError::TooLarge {
                width,
                height,
                max: MAX_TEXTURE_DIMENSION,
            });
        }
        let rgba = img.to_rgba8();
        Ok(Self {
            id: content_id(bytes),
            label: label.into(),
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// A single-color texture of the given size.
    pub fn solid(label: impl Into<String>, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels: Vec<u8> = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            id: content_id(&pixels),
            label: label.into(),
            width,
            height,
            pixels,
        }
    }

    /// Bytes per row, as the GPU upload expects it.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// Fetch and decode a texture, blocking the calling thread.
pub(crate) fn fetch(source: &TextureSource) -> Result<TextureData, AssetError> {
    let bytes = match source {
        TextureSource::Url(url) => {
            let response = reqwest::blocking::get(url)?;
            let status = response.status();
            if !status.is_success() {
                return Err(AssetError::HttpStatus {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }
            response.bytes()?.to_vec()
        }
        TextureSource::Path(path) => std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?,
    };
    tracing::debug!(%source, bytes = bytes.len(), "texture bytes fetched");
    TextureData::decode(source.to_string(), &bytes)
}

fn content_id(bytes: &[u8]) -> AssetId {
    let digest = Sha256::digest(bytes);
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    AssetId(u64::from_le_bytes(head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decode_png() {
        let tex = TextureData::decode("red", &png_bytes(4, 2)).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.pixels.len(), 4 * 2 * 4);
        assert_eq!(&tex.pixels[..4], &[200, 10, 10, 255]);
        assert_eq!(tex.bytes_per_row(), 16);
    }

    #[test]
    fn decode_garbage_fails() {
        let err = TextureData::decode("junk", b"not an image").unwrap_err();
        assert!(matches!(err, AssetError::Decode(_)));
    }

    #[test]
    fn oversized_image_is_rejected() {
        let wide = png_bytes(MAX_TEXTURE_DIMENSION + 808, 1);
        let err = TextureData::decode("wide", &wide).unwrap_err();
        assert!(matches!(
            err,
            AssetError::TooLarge {
                width: 9000,
                height: 1,
                max: MAX_TEXTURE_DIMENSION
            }
        ));

        let tex = TextureData::decode("edge", &png_bytes(MAX_TEXTURE_DIMENSION, 1)).unwrap();
        assert_eq!(tex.width, MAX_TEXTURE_DIMENSION);
    }

    #[test]
    fn content_addressed_ids() {
        let a = TextureData::decode("a", &png_bytes(2, 2)).unwrap();
        let b = TextureData::decode("b", &png_bytes(2, 2)).unwrap();
        let c = TextureData::decode("c", &png_bytes(3, 2)).unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn solid_texture_fills_every_pixel() {
        let tex = TextureData::solid("white", 2, 3, [255, 255, 255, 255]);
        assert_eq!(tex.pixels.len(), 24);
        assert!(tex.pixels.iter().all(|b| *b == 255));
    }

    #[test]
    fn fetch_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tex.png");
        std::fs::write(&path, png_bytes(8, 8)).unwrap();

        let tex = fetch(&TextureSource::Path(path)).unwrap();
        assert_eq!(tex.width, 8);
        assert!(tex.label.ends_with("tex.png"));
    }

    #[test]
    fn fetch_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fetch(&TextureSource::Path(dir.path().join("missing.jpg"))).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
