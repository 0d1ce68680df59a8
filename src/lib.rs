mod utils;
pub mod common;
pub mod data;
pub mod error;
pub mod extraction_runners;
pub mod match_engine;

use std::time::Instant;

use anyhow::Context;

use crate::common::{NormalizedImage, PipelineConfig, VehicleRecord};
use crate::data::{ApprovedRegistry, MatchReport};
use crate::extraction_runners::{PlateTextExtractor, TesseractCli};
use crate::match_engine::MatchEngine;

pub use crate::error::MatchError;

pub type Result<T, E = MatchError> = std::result::Result<T, E>;

/// Builds the tesseract-backed engine from `config`, checks the binary is
/// there and runs one blank image through it.
pub fn init_extractor(config: &PipelineConfig) -> anyhow::Result<TesseractCli> {
    config.validate()?;
    log::info!("Initializing OCR engine\n{}", config.to_string());

    let engine = TesseractCli::from_config(config);
    engine
        .probe()
        .with_context(|| format!("OCR engine `{}` is not usable", config.tesseract_cmd))?;

    let blank = NormalizedImage::new(image::GrayImage::new(config.target_width, config.target_height));
    engine.extract(&blank).context("OCR warm-up call failed")?;
    Ok(engine)
}

/// Builds an engine for `config` around any extractor after probing it.
pub fn init_engine<E: PlateTextExtractor>(config: &PipelineConfig, extractor: E) -> anyhow::Result<MatchEngine<E>> {
    config.validate()?;
    extractor
        .probe()
        .with_context(|| format!("OCR engine `{}` is not usable", extractor.name()))?;
    Ok(MatchEngine::new(config, extractor))
}

pub fn run_match<E: PlateTextExtractor>(
    engine: &MatchEngine<E>,
    records: &[VehicleRecord],
    registry: &ApprovedRegistry,
) -> Result<MatchReport> {
    let now = Instant::now();

    let report = engine.match_records(records, registry)?;

    log::debug!("Processing time: {:?}", now.elapsed());

    Ok(report)
}
