//! Attachment patterns and per-category growth guidance.

use crate::models::{AttachmentFlags, Category, Reflection};
use serde::Serialize;
use std::fmt;

/// Shown under every active dashboard.
pub const DAILY_PROMPT: &str = "Think of one interaction in the last 24 hours that mattered. \
What did you do that moved it closer to (or farther from) the relationship you want?";

/// Attachment tendency reported most often in recent reflections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttachmentPattern {
    Secure,
    Anxious,
    Avoidant,
    Disorganized,
}

impl AttachmentPattern {
    /// Tie-break order.
    pub const ALL: [AttachmentPattern; 4] = [
        AttachmentPattern::Secure,
        AttachmentPattern::Anxious,
        AttachmentPattern::Avoidant,
        AttachmentPattern::Disorganized,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AttachmentPattern::Secure => "Secure",
            AttachmentPattern::Anxious => "Anxious",
            AttachmentPattern::Avoidant => "Avoidant",
            AttachmentPattern::Disorganized => "Disorganized",
        }
    }

    fn is_set(&self, flags: &AttachmentFlags) -> bool {
        match self {
            AttachmentPattern::Secure => flags.secure,
            AttachmentPattern::Anxious => flags.anxious,
            AttachmentPattern::Avoidant => flags.avoidant,
            AttachmentPattern::Disorganized => flags.disorganized,
        }
    }
}

impl fmt::Display for AttachmentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Most frequent attachment flag across the last `window` reflections.
///
/// Reflections are taken in timestamp order, the same slice the point
/// estimate uses. Ties go to the earlier pattern in [`AttachmentPattern::ALL`];
/// `None` when no reflection in the window carries a flag.
pub fn dominant_pattern(reflections: &[Reflection], window: usize) -> Option<AttachmentPattern> {
    let mut ordered: Vec<&Reflection> = reflections.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);
    let recent = &ordered[ordered.len().saturating_sub(window.max(1))..];

    let counts = AttachmentPattern::ALL.map(|pattern| {
        let count = recent
            .iter()
            .filter(|r| pattern.is_set(&r.attachment))
            .count();
        (pattern, count)
    });
    let (pattern, count) = counts
        .iter()
        .copied()
        .fold(counts[0], |best, next| if next.1 > best.1 { next } else { best });

    (count > 0).then_some(pattern)
}

/// What a weak category tends to look like and where to start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthFocus {
    pub category: Category,
    pub summary: &'static str,
    pub behaviors: [&'static str; 3],
    pub opportunities: [&'static str; 3],
}

/// Guidance for a category, used for the dashboard's blind spot.
pub fn growth_focus(category: Category) -> GrowthFocus {
    let (summary, behaviors, opportunities) = match category {
        Category::Communication => (
            "Needs and concerns may go unspoken, or surface only once they have built up.",
            [
                "You wait for the other person to raise hard topics.",
                "Check-ins happen only after something has gone wrong.",
                "Small frustrations get stored instead of named.",
            ],
            [
                "Name one need each day, however small.",
                "Pair honesty with curiosity: \"How did that land for you?\"",
                "Ask one more question before offering advice.",
            ],
        ),
        Category::Empathy => (
            "Feelings may be getting solved before they are understood.",
            [
                "You reach for a fix before acknowledging how they feel.",
                "Their reactions sometimes catch you by surprise.",
                "Conversations drift back to your own perspective.",
            ],
            [
                "Reflect back what you heard before responding.",
                "Ask whether they want support or solutions.",
                "Notice when you might talk instead of listening.",
            ],
        ),
        Category::Reliability => (
            "Follow-through may be uneven, which makes trust harder to build.",
            [
                "Plans shift at short notice.",
                "Promises made in the moment are forgotten later.",
                "Small commitments start to feel optional.",
            ],
            [
                "Make fewer promises and keep every one.",
                "Say early when a plan has to change.",
                "Pick one shared ritual and protect it.",
            ],
        ),
        Category::ConflictNavigation => (
            "Disagreements may escalate or get avoided instead of resolved.",
            [
                "Voices rise or conversations shut down when tension appears.",
                "Old arguments resurface without a resolution.",
                "Someone walks away before any repair happens.",
            ],
            [
                "Call a short pause when things heat up, then come back to it.",
                "Name the issue, not the person.",
                "End each disagreement with one concrete next step.",
            ],
        ),
        Category::Connection => (
            "Shared time may be getting crowded out by everything else.",
            [
                "Time together happens around screens or errands.",
                "Affection shows up less often than either of you want.",
                "You rarely try something new together.",
            ],
            [
                "Schedule time together and keep it free of phones.",
                "Share one appreciation every day.",
                "Plan one small new experience this month.",
            ],
        ),
    };

    GrowthFocus {
        category,
        summary,
        behaviors,
        opportunities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryScores, Party, ReflectionInput};
    use chrono::{Duration, TimeZone, Utc};

    fn create_test_reflection(minute: i64, attachment: AttachmentFlags) -> Reflection {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        Reflection::new(
            base + Duration::minutes(minute),
            ReflectionInput {
                party: Party::A,
                effort: 3,
                answers: Vec::new(),
                attachment,
            },
            CategoryScores::new(),
            50.0,
        )
    }

    fn secure() -> AttachmentFlags {
        AttachmentFlags {
            secure: true,
            ..Default::default()
        }
    }

    fn avoidant() -> AttachmentFlags {
        AttachmentFlags {
            avoidant: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_flags_no_pattern() {
        assert_eq!(dominant_pattern(&[], 10), None);

        let reflections = vec![create_test_reflection(0, AttachmentFlags::default())];
        assert_eq!(dominant_pattern(&reflections, 10), None);
    }

    #[test]
    fn test_pattern_follows_window() {
        // Submitted out of order; the two latest by timestamp are avoidant.
        let reflections = vec![
            create_test_reflection(4, avoidant()),
            create_test_reflection(0, secure()),
            create_test_reflection(1, secure()),
            create_test_reflection(2, secure()),
            create_test_reflection(3, avoidant()),
        ];
        assert_eq!(dominant_pattern(&reflections, 10), Some(AttachmentPattern::Secure));
        assert_eq!(dominant_pattern(&reflections, 2), Some(AttachmentPattern::Avoidant));
    }

    #[test]
    fn test_pattern_ties_prefer_earlier_style() {
        let both = AttachmentFlags {
            anxious: true,
            disorganized: true,
            ..Default::default()
        };
        let reflections = vec![create_test_reflection(0, both)];
        assert_eq!(dominant_pattern(&reflections, 10), Some(AttachmentPattern::Anxious));
    }

    #[test]
    fn test_growth_focus_covers_every_category() {
        for category in Category::ALL {
            let focus = growth_focus(category);
            assert_eq!(focus.category, category);
            assert!(!focus.summary.is_empty());
            assert!(focus.opportunities.iter().all(|o| !o.is_empty()));
        }
    }
}
