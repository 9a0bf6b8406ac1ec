//! Rendering of attack results and campaign reports.

pub mod json;
pub mod terminal;

pub use json::{to_json, to_json_lines, to_json_pretty};
pub use terminal::{format_attack_result, format_campaign_summary, format_dataset_summary};
