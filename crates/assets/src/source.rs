use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The flower photo the demo scene wraps around its cube.
pub const DEFAULT_TEXTURE_URL: &str =
    "https://threejsfundamentals.org/threejs/resources/images/flower-1.jpg";

/// Where texture bytes come from.
///
/// Strings starting with `http://` or `https://` are URLs; anything else is a
/// filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TextureSource {
    Url(String),
    Path(PathBuf),
}

impl TextureSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, TextureSource::Url(_))
    }
}

impl Default for TextureSource {
    fn default() -> Self {
        TextureSource::Url(DEFAULT_TEXTURE_URL.to_string())
    }
}

impl FromStr for TextureSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(TextureSource::Url(s.to_string()))
        } else {
            Ok(TextureSource::Path(PathBuf::from(s)))
        }
    }
}

impl From<String> for TextureSource {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(source) => source,
            Err(never) => match never {},
        }
    }
}

impl From<TextureSource> for String {
    fn from(source: TextureSource) -> Self {
        source.to_string()
    }
}

impl fmt::Display for TextureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureSource::Url(url) => f.write_str(url),
            TextureSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_flower_url() {
        let src = TextureSource::default();
        assert!(src.is_remote());
        assert_eq!(src.to_string(), DEFAULT_TEXTURE_URL);
    }

    #[test]
    fn parse_url_and_path() {
        let url: TextureSource = "https://example.com/x.png".parse().unwrap();
        assert_eq!(url, TextureSource::Url("https://example.com/x.png".into()));

        let path: TextureSource = "assets/crate.jpg".parse().unwrap();
        assert_eq!(path, TextureSource::Path(PathBuf::from("assets/crate.jpg")));
        assert!(!path.is_remote());
    }
}
