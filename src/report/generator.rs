//! Dashboard report generation.
//!
//! Renders a thread's dashboard snapshot as Markdown or JSON.

use super::growth::{dominant_pattern, growth_focus, AttachmentPattern, GrowthFocus, DAILY_PROMPT};
use super::wheel::{wheel_segments, WheelSegment};
use crate::models::{Category, DashboardSnapshot, Party, Thread};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything shown on a thread's dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub invite_code: String,
    pub name_a: String,
    pub name_b: String,
    pub withdrawn: bool,
    pub generated_at: DateTime<Utc>,
    pub ema_alpha: f64,
    pub window: usize,
    pub snapshot: DashboardSnapshot,
    pub wheel: Vec<WheelSegment>,
    pub insights: Vec<String>,
    pub pattern: Option<AttachmentPattern>,
    /// Guidance for the blind-spot category.
    pub growth: Option<GrowthFocus>,
    pub reflection_prompt: &'static str,
}

impl DashboardReport {
    pub fn new(thread: &Thread, snapshot: DashboardSnapshot, ema_alpha: f64, window: usize) -> Self {
        let pattern = dominant_pattern(&thread.reflections, window);
        let growth = extremes(&snapshot)
            .and_then(|(_, weakest)| weakest)
            .map(growth_focus);

        Self {
            invite_code: thread.invite_code.clone(),
            name_a: thread.display_name(Party::A).to_string(),
            name_b: thread.display_name(Party::B).to_string(),
            withdrawn: thread.withdrawn,
            generated_at: Utc::now(),
            ema_alpha,
            window,
            wheel: wheel_segments(&snapshot),
            insights: insights(&snapshot, pattern),
            pattern,
            growth,
            reflection_prompt: DAILY_PROMPT,
            snapshot,
        }
    }
}

/// Strongest category by point estimate, plus the weakest when the points differ.
fn extremes(snapshot: &DashboardSnapshot) -> Option<(Category, Option<Category>)> {
    if snapshot.count == 0 {
        return None;
    }

    // Ties resolve to the earlier category in display order.
    let points = Category::ALL.map(|c| (c, snapshot.category(c).point));
    let (strongest, top) = points
        .iter()
        .copied()
        .fold(points[0], |best, next| if next.1 > best.1 { next } else { best });
    let (weakest, bottom) = points
        .iter()
        .copied()
        .fold(points[0], |worst, next| if next.1 < worst.1 { next } else { worst });

    Some((strongest, (bottom < top).then_some(weakest)))
}

/// Strength, blind spot and attachment pattern signals.
pub fn insights(snapshot: &DashboardSnapshot, pattern: Option<AttachmentPattern>) -> Vec<String> {
    let Some((strongest, weakest)) = extremes(snapshot) else {
        return Vec::new();
    };

    let mut lines = vec![format!("Strength: {}", strongest)];
    if let Some(weakest) = weakest {
        lines.push(format!("Blind Spot: {}", weakest));
    }
    if let Some(pattern) = pattern {
        lines.push(format!("Pattern: {} Attachment Tendencies", pattern));
    }
    lines
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DashboardReport) -> String {
    let mut output = String::new();

    output.push_str("# RelateScore Dashboard\n\n");
    output.push_str(&generate_metadata_section(report));

    if report.withdrawn {
        output.push_str("## Dashboard Reset\n\n");
        output.push_str(
            "Consent was withdrawn and every reflection in this thread was erased. \
             Create a new invite code to start again.\n\n",
        );
        output.push_str(&generate_footer());
        return output;
    }

    output.push_str(&generate_index_section(&report.snapshot));
    output.push_str(&generate_category_section(&report.snapshot));
    output.push_str(&generate_wheel_section(&report.wheel));
    output.push_str(&generate_insights_section(&report.insights));
    if let Some(ref growth) = report.growth {
        output.push_str(&generate_growth_section(growth));
    }
    output.push_str(&generate_prompt_section(report.reflection_prompt));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(report: &DashboardReport) -> String {
    let mut section = String::new();

    section.push_str("## Thread\n\n");
    section.push_str(&format!("- **Invite Code:** `{}`\n", report.invite_code));
    section.push_str(&format!(
        "- **Parties:** {} & {}\n",
        report.name_a, report.name_b
    ));
    section.push_str(&format!("- **Reflections:** {}\n", report.snapshot.count));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Window / Alpha:** {} / {:.2}\n",
        report.window, report.ema_alpha
    ));
    section.push('\n');

    section
}

fn generate_index_section(snapshot: &DashboardSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Relationship Growth Index\n\n");
    if snapshot.count == 0 {
        section.push_str("No reflections yet. Both parties must consent before reflecting.\n\n");
    }
    section.push_str("| Point | Trend |\n");
    section.push_str("|:---:|:---:|\n");
    section.push_str(&format!(
        "| **{:.1}** / 100 | {:.1} / 100 |\n\n",
        snapshot.composite.point, snapshot.composite.trend
    ));

    section
}

fn generate_category_section(snapshot: &DashboardSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Categories\n\n");
    section.push_str("| Category | Point | Trend |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for category in Category::ALL {
        let estimate = snapshot.category(category);
        section.push_str(&format!(
            "| {} | {:.1} | {:.1} |\n",
            category, estimate.point, estimate.trend
        ));
    }
    section.push('\n');

    section
}

fn generate_wheel_section(segments: &[WheelSegment]) -> String {
    let mut section = String::new();

    section.push_str("## RQ Wheel\n\n");
    section.push_str("| Segment | From (rad) | To (rad) | Radius | Opacity | Colour |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---:|\n");
    for segment in segments {
        section.push_str(&format!(
            "| {} | {:.3} | {:.3} | {:.1} | {:.2} | `{}` |\n",
            segment.category,
            segment.start_angle,
            segment.end_angle,
            segment.radius,
            segment.fill_alpha,
            segment.color
        ));
    }
    section.push('\n');

    section
}

fn generate_insights_section(insights: &[String]) -> String {
    if insights.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Top Signals\n\n");
    for (i, insight) in insights.iter().enumerate() {
        section.push_str(&format!("{}. **{}**\n", i + 1, insight));
    }
    section.push_str("\nThese are directional insights, not permanent labels.\n\n");

    section
}

fn generate_growth_section(growth: &GrowthFocus) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Growth Focus: {}\n\n", growth.category));
    section.push_str(growth.summary);
    section.push_str("\n\n### Behaviors often linked to this pattern\n\n");
    for behavior in growth.behaviors {
        section.push_str(&format!("- {}\n", behavior));
    }
    section.push_str("\n### Growth Opportunities\n\n");
    for opportunity in growth.opportunities {
        section.push_str(&format!("- {}\n", opportunity));
    }
    section.push('\n');

    section
}

fn generate_prompt_section(prompt: &str) -> String {
    format!("## Daily Reflection Prompt\n\n> {}\n\n", prompt)
}

fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*This is not a diagnosis. It's a reflection tool.*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttachmentFlags, CategoryScores, Estimate, Reflection, ReflectionInput};

    fn create_test_thread() -> Thread {
        Thread::new(
            "RS-TESTCODE".to_string(),
            "Ana".to_string(),
            "Ben".to_string(),
            Utc::now(),
        )
    }

    fn create_test_snapshot() -> DashboardSnapshot {
        let mut snapshot = DashboardSnapshot::empty();
        snapshot.count = 3;
        snapshot.composite = Estimate {
            point: 61.2,
            trend: 58.4,
        };
        snapshot.categories.insert(
            Category::Empathy,
            Estimate {
                point: 80.0,
                trend: 75.0,
            },
        );
        snapshot.categories.insert(
            Category::Communication,
            Estimate {
                point: 55.0,
                trend: 50.0,
            },
        );
        snapshot
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = DashboardReport::new(&create_test_thread(), create_test_snapshot(), 0.5, 10);
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# RelateScore Dashboard"));
        assert!(markdown.contains("RS-TESTCODE"));
        assert!(markdown.contains("Ana & Ben"));
        assert!(markdown.contains("**61.2** / 100"));
        assert!(markdown.contains("| Conflict Navigation | 0.0 | 0.0 |"));
        assert!(markdown.contains("## RQ Wheel"));
        assert!(markdown.contains("Strength: Empathy"));
    }

    #[test]
    fn test_withdrawn_report_hides_scores() {
        let mut thread = create_test_thread();
        thread.withdraw();
        let report = DashboardReport::new(&thread, DashboardSnapshot::empty(), 0.5, 10);
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("Dashboard Reset"));
        assert!(!markdown.contains("## Categories"));
    }

    #[test]
    fn test_insights() {
        assert!(insights(&DashboardSnapshot::empty(), Some(AttachmentPattern::Secure)).is_empty());

        let lines = insights(&create_test_snapshot(), Some(AttachmentPattern::Avoidant));
        assert_eq!(
            lines,
            vec![
                "Strength: Empathy",
                "Blind Spot: Reliability",
                "Pattern: Avoidant Attachment Tendencies",
            ]
        );
    }

    #[test]
    fn test_insights_without_spread() {
        let mut snapshot = DashboardSnapshot::empty();
        snapshot.count = 1;
        assert_eq!(insights(&snapshot, None), vec!["Strength: Communication"]);
    }

    #[test]
    fn test_report_derives_pattern_from_thread() {
        let mut thread = create_test_thread();
        thread.set_consent(Party::A, true).unwrap();
        thread.set_consent(Party::B, true).unwrap();
        for attachment in [
            AttachmentFlags {
                secure: true,
                ..Default::default()
            },
            AttachmentFlags {
                secure: true,
                anxious: true,
                ..Default::default()
            },
        ] {
            let input = ReflectionInput {
                party: Party::A,
                effort: 3,
                answers: Vec::new(),
                attachment,
            };
            thread
                .append_reflection(Reflection::new(Utc::now(), input, CategoryScores::new(), 50.0))
                .unwrap();
        }

        let report = DashboardReport::new(&thread, create_test_snapshot(), 0.5, 10);
        assert_eq!(report.pattern, Some(AttachmentPattern::Secure));
        assert!(report
            .insights
            .contains(&"Pattern: Secure Attachment Tendencies".to_string()));
    }

    #[test]
    fn test_markdown_includes_growth_and_prompt() {
        let report = DashboardReport::new(&create_test_thread(), create_test_snapshot(), 0.5, 10);
        assert_eq!(report.growth.map(|g| g.category), Some(Category::Reliability));

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("## Growth Focus: Reliability"));
        assert!(markdown.contains("- Make fewer promises and keep every one."));
        assert!(markdown.contains("## Daily Reflection Prompt"));
        assert!(markdown.contains("> Think of one interaction in the last 24 hours that mattered."));
    }

    #[test]
    fn test_no_growth_focus_without_reflections() {
        let report = DashboardReport::new(&create_test_thread(), DashboardSnapshot::empty(), 0.5, 10);
        assert!(report.growth.is_none());
        assert!(!generate_markdown_report(&report).contains("## Growth Focus"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = DashboardReport::new(&create_test_thread(), create_test_snapshot(), 0.5, 10);
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"invite_code\""));
        assert!(json.contains("\"composite\""));
        assert!(json.contains("\"Conflict Navigation\""));
        assert!(json.contains("\"wheel\""));
        assert!(json.contains("\"growth\""));
        assert!(json.contains("\"reflection_prompt\""));
    }
}
