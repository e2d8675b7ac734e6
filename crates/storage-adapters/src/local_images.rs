//! # LocalImageLoader
//!
//! Scanned pages stored under a media root, addressed by their path relative
//! to it. A fetched page is decoded far enough to learn its dimensions and kept
//! in memory, so each reference hits the disk at most once.

use std::io::{Cursor, ErrorKind};
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use domains::{DomainError, ImageLoader, ImageRef, Result};
use image::ImageReader;
use tracing::debug;

/// A page ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

pub struct LocalImageLoader {
    /// Root directory of the scanned pages (e.g., "./data/solutions")
    root_path: PathBuf,
    cache: DashMap<ImageRef, CachedImage>,
}

impl LocalImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root.into(),
            cache: DashMap::new(),
        }
    }

    pub fn get(&self, image: &ImageRef) -> Option<CachedImage> {
        self.cache.get(image).map(|entry| entry.value().clone())
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Maps a reference onto the media root. Absolute paths and `..` are refused.
    fn resolve(&self, image: &ImageRef) -> Result<PathBuf> {
        let relative = Path::new(image.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if image.as_str().is_empty() || escapes {
            return Err(DomainError::Validation(format!("image reference '{image}' is outside the media root")));
        }
        Ok(self.root_path.join(relative))
    }
}

fn decode_dimensions(data: &[u8]) -> std::result::Result<(u32, u32), String> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .into_dimensions()
        .map_err(|e| e.to_string())
}

#[async_trait]
impl ImageLoader for LocalImageLoader {
    async fn fetch(&self, image: &ImageRef) -> Result<()> {
        if self.cache.contains_key(image) {
            return Ok(());
        }
        let path = self.resolve(image)?;
        let data = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => DomainError::NotFound("image".into(), image.to_string()),
            _ => DomainError::Unavailable(format!("{}: {e}", path.display())),
        })?;

        let (width, height) = decode_dimensions(&data)
            .map_err(|e| DomainError::Validation(format!("image '{image}' is not decodable: {e}")))?;

        debug!(%image, width, height, bytes = data.len(), "image cached");
        self.cache.insert(
            image.clone(),
            CachedImage {
                bytes: Bytes::from(data),
                width,
                height,
            },
        );
        Ok(())
    }

    fn is_cached(&self, image: &ImageRef) -> bool {
        self.cache.contains_key(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tokio_test::assert_ok;
    use uuid::Uuid;

    fn media_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!("portal-media-{}", Uuid::new_v4()));
        std::fs::create_dir_all(root.join("algebra")).unwrap();
        RgbImage::new(4, 3).save(root.join("algebra/p1.png")).unwrap();
        std::fs::write(root.join("algebra/notes.txt"), b"not an image").unwrap();
        root
    }

    #[tokio::test]
    async fn test_fetch_decodes_and_caches() {
        let root = media_root();
        let loader = LocalImageLoader::new(&root);
        let page = ImageRef::from("algebra/p1.png");

        assert!(!loader.is_cached(&page));
        assert_ok!(loader.fetch(&page).await);
        assert!(loader.is_cached(&page));
        let cached = loader.get(&page).unwrap();
        assert_eq!((cached.width, cached.height), (4, 3));

        // A cached page is served without touching the disk again.
        std::fs::remove_dir_all(&root).unwrap();
        assert_ok!(loader.fetch(&page).await);
        assert_eq!(loader.cached_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_and_undecodable_pages() {
        let root = media_root();
        let loader = LocalImageLoader::new(&root);

        let missing = loader.fetch(&ImageRef::from("algebra/p9.png")).await;
        assert!(matches!(missing, Err(DomainError::NotFound(_, _))));

        let garbage = loader.fetch(&ImageRef::from("algebra/notes.txt")).await;
        assert!(matches!(garbage, Err(DomainError::Validation(_))));
        assert_eq!(loader.cached_count(), 0);
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn test_references_cannot_escape_root() {
        let loader = LocalImageLoader::new(std::env::temp_dir());
        for reference in ["../etc/passwd", "/etc/passwd", ""] {
            let result = loader.fetch(&ImageRef::from(reference)).await;
            assert!(matches!(result, Err(DomainError::Validation(_))), "{reference}");
        }
    }
}
