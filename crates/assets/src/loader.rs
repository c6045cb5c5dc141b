use crate::texture::{self, TextureData};
use crate::{AssetError, TextureSource};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Starts texture loads on background threads.
#[derive(Debug, Clone)]
pub struct TextureLoader {
    thread_name: String,
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self {
            thread_name: "texture-loader".into(),
        }
    }
}

impl TextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin fetching and decoding `source`. Returns immediately.
    ///
    /// The result arrives exactly once through the returned handle. If the
    /// worker thread cannot be spawned the handle resolves to that error.
    pub fn load(&self, source: TextureSource) -> PendingTexture {
        let (tx, rx) = mpsc::channel();
        let job_source = source.clone();
        let spawned = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || {
                let _span = tracing::debug_span!("texture_load", source = %job_source).entered();
                let result = texture::fetch(&job_source);
                if let Err(e) = &result {
                    tracing::debug!("texture load failed: {e}");
                }
                // The receiver may already be gone if the scene was dropped.
                let _ = tx.send(result);
            });

        started(source, rx, spawned.map(drop))
    }
}

/// Wrap the receiving end of a load, or the reason the worker never ran.
fn started(
    source: TextureSource,
    rx: Receiver<Result<TextureData, AssetError>>,
    spawned: std::io::Result<()>,
) -> PendingTexture {
    match spawned {
        Ok(()) => {
            tracing::info!(%source, remote = source.is_remote(), "texture load started");
            PendingTexture { source, rx }
        }
        Err(e) => PendingTexture::resolved(source, Err(AssetError::Spawn(e))),
    }
}

/// Handle to a texture that may not have finished loading.
///
/// Poll it once per frame with [`PendingTexture::try_take`]; it yields
/// `Some` exactly once, either the decoded texture or the reason it failed.
#[derive(Debug)]
pub struct PendingTexture {
    source: TextureSource,
    rx: Receiver<Result<TextureData, AssetError>>,
}

impl PendingTexture {
    /// A handle whose outcome is already known.
    pub fn resolved(source: TextureSource, result: Result<TextureData, AssetError>) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self { source, rx }
    }

    pub fn source(&self) -> &TextureSource {
        &self.source
    }

    /// Non-blocking poll. `None` means still loading.
    pub fn try_take(&self) -> Option<Result<TextureData, AssetError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AssetError::Disconnected)),
        }
    }

    /// Block until the load finishes.
    pub fn wait(self) -> Result<TextureData, AssetError> {
        self.rx.recv().unwrap_or(Err(AssetError::Disconnected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn write_png(dir: &std::path::Path) -> PathBuf {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        let path = dir.join("flower.png");
        std::fs::write(&path, out.into_inner()).unwrap();
        path
    }

    #[test]
    fn loads_file_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path());

        let pending = TextureLoader::new().load(TextureSource::Path(path));
        let tex = pending.wait().unwrap();
        assert_eq!((tex.width, tex.height), (4, 4));
    }

    #[test]
    fn missing_file_resolves_to_error() {
        let pending =
            TextureLoader::new().load(TextureSource::Path("/definitely/not/here.jpg".into()));
        assert!(matches!(pending.wait(), Err(AssetError::Io { .. })));
    }

    #[test]
    fn spawn_failure_resolves_to_spawn_error() {
        let (_tx, rx) = mpsc::channel();
        let err = std::io::Error::new(std::io::ErrorKind::OutOfMemory, "no threads left");
        let pending = started(TextureSource::default(), rx, Err(err));
        match pending.wait() {
            Err(AssetError::Spawn(e)) => assert_eq!(e.kind(), std::io::ErrorKind::OutOfMemory),
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_file_resolves_to_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbaImage::from_pixel(9000, 1, image::Rgba([0, 0, 0, 255]));
        let path = dir.path().join("wide.png");
        img.save(&path).unwrap();

        let pending = TextureLoader::new().load(TextureSource::Path(path));
        assert!(matches!(pending.wait(), Err(AssetError::TooLarge { .. })));
    }

    #[test]
    fn resolved_handle_yields_once() {
        let pending = PendingTexture::resolved(
            TextureSource::default(),
            Ok(TextureData::solid("w", 1, 1, [255; 4])),
        );
        assert!(matches!(pending.try_take(), Some(Ok(_))));
        // Sender dropped after the single result.
        assert!(matches!(pending.try_take(), Some(Err(AssetError::Disconnected))));
    }

    #[test]
    fn poll_eventually_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path());
        let pending = TextureLoader::new().load(TextureSource::Path(path));

        let mut result = None;
        for _ in 0..500 {
            if let Some(r) = pending.try_take() {
                result = Some(r);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(matches!(result, Some(Ok(_))));
    }
}
