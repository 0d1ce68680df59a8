//! Deterministic engine for tests and dry runs.
//!
//! Images are told apart by their mean intensity, so a test can paint each
//! vehicle image a distinct flat gray and script what the "OCR" reads there.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::common::{NormalizedImage, PlateCandidate};
use crate::error::ExtractionError;
use crate::extraction_runners::PlateTextExtractor;

// Resampling may move a flat gray by a step or two.
const INTENSITY_TOLERANCE: u8 = 2;

#[derive(Debug, Clone)]
enum Scripted {
    Text(PlateCandidate),
    Timeout,
    Fail(String),
}

#[derive(Debug, Default)]
pub struct MockExtractor {
    script: Vec<(u8, Scripted, Duration)>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl MockExtractor {
    pub fn new() -> Self {
        Default::default()
    }

    /// An engine whose every call reports it cannot be reached.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn with_text(self, intensity: u8, text: &str) -> Self {
        self.with_candidate(intensity, PlateCandidate::new(text))
    }

    pub fn with_candidate(mut self, intensity: u8, candidate: PlateCandidate) -> Self {
        self.script.push((intensity, Scripted::Text(candidate), Duration::ZERO));
        self
    }

    /// Answers `text` for `intensity` only after sleeping `delay`.
    pub fn with_delayed_text(mut self, intensity: u8, text: &str, delay: Duration) -> Self {
        self.script.push((intensity, Scripted::Text(PlateCandidate::new(text)), delay));
        self
    }

    pub fn with_timeout(mut self, intensity: u8) -> Self {
        self.script.push((intensity, Scripted::Timeout, Duration::ZERO));
        self
    }

    pub fn with_failure(mut self, intensity: u8, message: &str) -> Self {
        self.script.push((intensity, Scripted::Fail(message.to_string()), Duration::ZERO));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, intensity: u8) -> Option<&(u8, Scripted, Duration)> {
        self.script
            .iter()
            .filter(|(key, _, _)| key.abs_diff(intensity) <= INTENSITY_TOLERANCE)
            .min_by_key(|(key, _, _)| key.abs_diff(intensity))
    }
}

impl PlateTextExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    fn extract(&self, image: &NormalizedImage) -> Result<PlateCandidate, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(ExtractionError::EngineUnavailable("mock engine offline".into()));
        }

        match self.lookup(image.mean_intensity()) {
            None => Ok(PlateCandidate::empty()),
            Some((_, scripted, delay)) => {
                if !delay.is_zero() {
                    std::thread::sleep(*delay);
                }
                match scripted {
                    Scripted::Text(candidate) => Ok(candidate.clone()),
                    Scripted::Timeout => Err(ExtractionError::Timeout(Duration::from_secs(10))),
                    Scripted::Fail(message) => Err(ExtractionError::Engine(message.clone())),
                }
            }
        }
    }

    fn probe(&self) -> Result<(), ExtractionError> {
        if self.unavailable {
            return Err(ExtractionError::EngineUnavailable("mock engine offline".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn flat(v: u8) -> NormalizedImage {
        NormalizedImage::new(GrayImage::from_pixel(4, 4, Luma([v])))
    }

    #[test]
    fn answers_by_nearest_intensity() {
        let mock = MockExtractor::new().with_text(100, "ABC-123").with_text(103, "XYZ789");
        assert_eq!(mock.extract(&flat(99)).unwrap().text, "ABC-123");
        assert_eq!(mock.extract(&flat(104)).unwrap().text, "XYZ789");
        assert!(mock.extract(&flat(200)).unwrap().is_empty());
        assert_eq!(mock.calls(), 3);
    }

    #[test]
    fn is_stable_across_calls() {
        let mock = MockExtractor::new().with_candidate(50, PlateCandidate::new("Q1").with_confidence(42.0));
        assert_eq!(mock.extract(&flat(50)).unwrap(), mock.extract(&flat(50)).unwrap());
    }

    #[test]
    fn scripted_failures() {
        let mock = MockExtractor::new().with_timeout(10).with_failure(60, "boom");
        assert!(matches!(mock.extract(&flat(10)), Err(ExtractionError::Timeout(_))));
        assert!(matches!(mock.extract(&flat(60)), Err(ExtractionError::Engine(_))));
        assert!(MockExtractor::unavailable().probe().is_err());
        assert!(MockExtractor::unavailable().extract(&flat(1)).unwrap_err().is_systemic());
    }
}
