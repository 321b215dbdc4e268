pub mod bounding_box;
pub mod math_helper;

pub use self::bounding_box::BoundingBox;
