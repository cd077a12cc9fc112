pub mod client;
pub mod extractor;
pub mod prompts;
pub mod retry;
pub mod types;
pub mod utils;

pub use client::*;
pub use extractor::*;
pub use retry::RetryPolicy;
pub use types::*;
