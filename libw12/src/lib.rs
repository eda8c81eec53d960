pub use image::Image;
pub use word::Word;

pub mod image;
pub mod op;
pub mod word;
