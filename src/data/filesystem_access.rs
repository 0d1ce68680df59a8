//! Well-known directories the pipeline reads its settings from.

use std::path::PathBuf;

const APP_DIR: &str = "plate_match";

#[derive(Debug, Clone, Copy)]
pub enum FsAccess {
    Config,
}

impl FsAccess {
    /// Base directory without the `plate_match` subdirectory.
    ///
    /// Example: `~/.config`.
    pub fn raw_path(&self) -> anyhow::Result<PathBuf> {
        let base_path = match self {
            FsAccess::Config => dirs::config_dir(),
        };

        base_path.ok_or_else(|| {
            anyhow::anyhow!("Unable to locate the {:?} directory on this platform.", self)
        })
    }

    /// Application directory. Nothing is created on disk.
    ///
    /// Example: `~/.config/plate_match`.
    pub fn path(&self) -> anyhow::Result<PathBuf> {
        Ok(self.raw_path()?.join(APP_DIR))
    }
}
