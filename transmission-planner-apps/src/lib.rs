mod error;
mod scene_config;
pub mod utils;

pub use error::*;
pub use scene_config::*;
