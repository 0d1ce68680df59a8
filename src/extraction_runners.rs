pub mod image_ops;
mod mock;
mod plate_extractor;
mod tesseract;

pub use mock::MockExtractor;
pub use plate_extractor::PlateTextExtractor;
pub use tesseract::TesseractCli;
