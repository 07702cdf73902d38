//! Utility functions.

pub mod env;
pub mod format;
pub mod time;

pub use format::{format_bytes, format_metadata, format_optional_time};
pub use time::format_countdown;
