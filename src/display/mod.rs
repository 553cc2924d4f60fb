//! Display formatting for terminal output

pub mod budget;

pub use budget::{format_breakdown, format_category_details, format_rationale};
