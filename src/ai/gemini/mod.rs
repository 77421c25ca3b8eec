pub mod blame;
pub mod client;
pub mod image;
pub mod types;

pub use blame::BlameTextAdapter;
pub use client::GeminiHttpClient;
pub use image::ImagePromptAdapter;
