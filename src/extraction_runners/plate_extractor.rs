use crate::common::{NormalizedImage, PlateCandidate};
use crate::error::ExtractionError;

/// A text recognition engine reading one line of plate text.
///
/// Implementations must be stable: the same image and configuration give the
/// same candidate on every call. Engines are shared by all workers of a pass,
/// so calls may run concurrently.
pub trait PlateTextExtractor: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Reads the plate text from a preprocessed image.
    ///
    /// An unreadable image is not an error: it yields an empty candidate.
    fn extract(&self, image: &NormalizedImage) -> Result<PlateCandidate, ExtractionError>;

    /// Checks that the engine is reachable before a pass starts.
    fn probe(&self) -> Result<(), ExtractionError> {
        Ok(())
    }
}

impl<T: PlateTextExtractor + ?Sized> PlateTextExtractor for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract(&self, image: &NormalizedImage) -> Result<PlateCandidate, ExtractionError> {
        (**self).extract(image)
    }

    fn probe(&self) -> Result<(), ExtractionError> {
        (**self).probe()
    }
}
