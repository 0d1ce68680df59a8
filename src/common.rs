mod image_loader;
mod page_seg_mode;
mod pipeline_config;
mod plate_identifier;
mod plate_image;
mod vehicle_record;

pub use image_loader::*;
pub use page_seg_mode::*;
pub use pipeline_config::*;
pub use plate_identifier::*;
pub use plate_image::*;
pub use vehicle_record::*;
