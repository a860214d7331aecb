//! Dashboard rendering.

pub mod generator;
pub mod growth;
pub mod wheel;

pub use generator::{generate_json_report, generate_markdown_report, DashboardReport};
pub use growth::{dominant_pattern, growth_focus, AttachmentPattern, GrowthFocus, DAILY_PROMPT};
pub use wheel::{wheel_segments, WheelSegment};
