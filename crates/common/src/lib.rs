//! Shared value types used across the cube scene crates.

mod types;

pub use types::{Color, ColorParseError, SceneId, Transform};

pub fn crate_info() -> &'static str {
    "cubescene-common v0.1.0"
}
