// UI and formatting module

pub mod formatters;

pub use formatters::{format_datetime, format_size, format_time};
