//! Texture assets: where a texture comes from, how it is fetched, and the
//! decoded pixels handed to the renderer.
//!
//! # Invariants
//! - Textures are identified by a hash of their encoded bytes, never by path.
//! - Loading happens off the frame thread; the frame loop only polls.
//! - Decoded pixels are RGBA8 in the sRGB encoding of the source image.

mod loader;
mod source;
mod texture;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use loader::{PendingTexture, TextureLoader};
pub use source::{DEFAULT_TEXTURE_URL, TextureSource};
pub use texture::{MAX_TEXTURE_DIMENSION, TextureData};

/// Content-addressed asset ID computed from the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has zero size")]
    EmptyImage,
    #[error("image is {width}x{height}, larger than the {max} pixel texture limit")]
    TooLarge { width: u32, height: u32, max: u32 },
    #[error("failed to start texture loader thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("texture loader stopped before delivering a result")]
    Disconnected,
}

pub fn crate_info() -> &'static str {
    "cubescene-assets v0.1.0"
}
