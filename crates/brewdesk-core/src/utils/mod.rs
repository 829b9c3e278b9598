//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    capitalize, contains_ignore_case, format_currency, format_date, format_datetime,
    format_optional, truncate_string,
};
