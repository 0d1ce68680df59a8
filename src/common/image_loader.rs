use std::io::{Cursor, ErrorKind};
use std::path::{Component, Path, PathBuf};

use image::ImageReader;

use crate::common::RawImage;
use crate::error::LoadError;

/// Resolves record filenames under a fixed base directory and decodes them.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    base_dir: PathBuf,
}

impl ImageLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Joins `filename` onto the base directory. Only plain relative paths are
    /// accepted: no root, no prefix, no `..`.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(filename);
        let plain = !filename.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !plain {
            return Err(LoadError::OutsideBaseDir {
                filename: filename.to_string(),
            });
        }
        Ok(self.base_dir.join(relative))
    }

    pub fn load(&self, filename: &str) -> Result<RawImage, LoadError> {
        let path = self.resolve(filename)?;
        let bytes = std::fs::read(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => LoadError::NotFound {
                filename: filename.to_string(),
            },
            _ => LoadError::Io {
                filename: filename.to_string(),
                source,
            },
        })?;
        if bytes.is_empty() {
            return Err(LoadError::Empty {
                filename: filename.to_string(),
            });
        }

        // Sniff the format from content so a mislabeled extension still decodes.
        let decoded = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|source| LoadError::Io {
                filename: filename.to_string(),
                source,
            })?
            .decode()
            .map_err(|source| LoadError::Decode {
                filename: filename.to_string(),
                source,
            })?;

        log::trace!("Loaded {} ({}x{})", filename, decoded.width(), decoded.height());
        Ok(RawImage::from(decoded))
    }
}
