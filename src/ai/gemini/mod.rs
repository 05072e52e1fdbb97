pub mod client;
pub mod edit;
pub mod types;

pub use client::GeminiHttpClient;
pub use edit::GeminiEditClient;
