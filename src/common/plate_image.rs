use image::{DynamicImage, GrayImage, RgbImage};

/// Decoded pixels of one vehicle image, straight from the loader.
#[derive(Debug, Clone, Default)]
pub struct RawImage {
    pub image: RgbImage,
    pub img_width: u32,
    pub img_height: u32,
}

/// Fixed-size single-channel intensity image handed to the OCR engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedImage {
    pub image: GrayImage,
}

impl std::ops::Deref for RawImage {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl From<DynamicImage> for RawImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image.to_rgb8())
    }
}

impl From<RgbImage> for RawImage {
    fn from(image: RgbImage) -> Self {
        Self::new(image)
    }
}

impl RawImage {
    pub fn new(image: RgbImage) -> Self {
        let (img_width, img_height) = image.dimensions();
        Self {
            image,
            img_width,
            img_height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.img_width == 0 || self.img_height == 0
    }
}

impl std::ops::Deref for NormalizedImage {
    type Target = GrayImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl NormalizedImage {
    pub fn new(image: GrayImage) -> Self {
        Self { image }
    }

    /// Mean intensity, rounded.
    pub fn mean_intensity(&self) -> u8 {
        let raw = self.image.as_raw();
        if raw.is_empty() {
            return 0;
        }
        let sum: u64 = raw.iter().map(|&v| v as u64).sum();
        ((sum + raw.len() as u64 / 2) / raw.len() as u64) as u8
    }
}
