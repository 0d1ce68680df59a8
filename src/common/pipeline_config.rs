use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::PageSegMode;
use crate::data::{ApprovedRegistry, FsAccess};
use crate::error::ConfigError;

pub const DEFAULT_TARGET_SIZE: u32 = 416;
pub const DEFAULT_OCR_TIMEOUT_MS: u64 = 10_000;
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Everything a match pass needs, passed in explicitly at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory that record filenames are resolved against.
    pub base_dir: PathBuf,
    pub target_width: u32,
    pub target_height: u32,
    pub tesseract_cmd: String,
    pub page_seg_mode: PageSegMode,
    pub ocr_timeout_ms: u64,
    /// Worker count, which is also the cap on concurrent OCR calls.
    pub max_in_flight: usize,
    pub approved_plates: Vec<String>,
    /// Candidates reporting a lower confidence are treated as unreadable.
    pub min_confidence: Option<f32>,
    pub profile: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("data/cars_data"),
            target_width: DEFAULT_TARGET_SIZE,
            target_height: DEFAULT_TARGET_SIZE,
            tesseract_cmd: "tesseract".to_string(),
            page_seg_mode: PageSegMode::default(),
            ocr_timeout_ms: DEFAULT_OCR_TIMEOUT_MS,
            max_in_flight: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            approved_plates: vec!["ABC123".into(), "XYZ789".into(), "LMN456".into()],
            min_confidence: None,
            profile: false,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `<config dir>/plate_match/config.json`, or defaults when it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        match FsAccess::Config.path() {
            Ok(dir) => Self::load_or_default(&dir.join(CONFIG_FILE_NAME)),
            Err(e) => {
                log::debug!("{e} Using default config");
                Ok(Self::default())
            }
        }
    }

    /// Loads `path` when it is a file; a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            log::info!("Loading config from {}", path.display());
            Self::load(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "target size must be non-zero, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::Invalid("max_in_flight must be at least 1".into()));
        }
        if self.ocr_timeout_ms == 0 {
            return Err(ConfigError::Invalid("ocr_timeout_ms must be at least 1".into()));
        }
        if let Some(conf) = self.min_confidence {
            if !(0.0..=100.0).contains(&conf) {
                return Err(ConfigError::Invalid(format!(
                    "min_confidence must be within 0..=100, got {conf}"
                )));
            }
        }
        Ok(())
    }

    /// Builds the registry seed; any entry that normalizes to nothing is a config error.
    pub fn build_registry(&self) -> Result<ApprovedRegistry, ConfigError> {
        Ok(ApprovedRegistry::from_plates(&self.approved_plates)?)
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_millis(self.ocr_timeout_ms)
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn with_tesseract_cmd(mut self, cmd: &str) -> Self {
        self.tesseract_cmd = cmd.to_string();
        self
    }

    pub fn with_page_seg_mode(mut self, mode: PageSegMode) -> Self {
        self.page_seg_mode = mode;
        self
    }

    pub fn with_ocr_timeout_ms(mut self, ms: u64) -> Self {
        self.ocr_timeout_ms = ms;
        self
    }

    pub fn with_max_in_flight(mut self, n: usize) -> Self {
        self.max_in_flight = n;
        self
    }

    pub fn with_approved_plates(mut self, plates: &[&str]) -> Self {
        self.approved_plates = plates.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_min_confidence(mut self, conf: Option<f32>) -> Self {
        self.min_confidence = conf;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn to_string(&self) -> String {
        format!("Image Base Dir: {}\n\
        Target Size: {}x{}\n\
        Tesseract Command: {}\n\
        Page Segmentation: {}\n\
        OCR Timeout: {}ms\n\
        Max In-Flight OCR Calls: {}\n\
        Approved Plates: {}\n\
        Min Confidence: {:?}",
                self.base_dir.display(), self.target_width, self.target_height,
                self.tesseract_cmd, self.page_seg_mode, self.ocr_timeout_ms,
                self.max_in_flight, self.approved_plates.len(), self.min_confidence)
    }
}
