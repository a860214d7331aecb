//! Keyword heuristic for per-category reflection scores.
//!
//! Each category blends three signals clamped to [0, 1]: how much was
//! written, how many of the category's keyword stems appear, and the
//! self-reported effort. It is a placeholder for a calibrated model and
//! only promises determinism.

use super::ScoringStrategy;
use crate::models::{AttachmentFlags, Category, CategoryScores, ReflectionInput};

const COMMUNICATION_STEMS: &[&str] = &[
    "talk", "listen", "share", "express", "honest", "open up", "discuss", "explain",
];

const EMPATHY_STEMS: &[&str] = &[
    "feel", "understand", "care", "support", "compassion", "perspective", "empath", "validat",
];

const RELIABILITY_STEMS: &[&str] = &[
    "promise", "depend", "consistent", "trust", "follow through", "on time", "reliab", "commit",
];

const CONFLICT_STEMS: &[&str] = &[
    "compromis", "apolog", "resolv", "calm", "repair", "forgiv", "boundar", "middle ground",
];

const CONNECTION_STEMS: &[&str] = &[
    "together", "close", "love", "quality time", "connect", "affection", "laugh", "appreciat",
];

/// Escalation markers that pull Conflict Navigation down.
const NEGATIVE_CONFLICT_STEMS: &[&str] = &[
    "yell", "scream", "shout", "ignor", "blame", "insult", "slam", "silent treatment",
];

/// Keyword stems associated with a category.
pub fn stems(category: Category) -> &'static [&'static str] {
    match category {
        Category::Communication => COMMUNICATION_STEMS,
        Category::Empathy => EMPATHY_STEMS,
        Category::Reliability => RELIABILITY_STEMS,
        Category::ConflictNavigation => CONFLICT_STEMS,
        Category::Connection => CONNECTION_STEMS,
    }
}

/// Tunables for [`KeywordHeuristic`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicConfig {
    /// Characters of answer text that saturate the length signal.
    pub length_cap: usize,
    pub length_weight: f64,
    pub keyword_weight: f64,
    pub effort_weight: f64,
    /// Weight of the escalation signal subtracted from Conflict Navigation.
    pub negative_weight: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            length_cap: 500,
            length_weight: 0.25,
            keyword_weight: 0.45,
            effort_weight: 0.30,
            negative_weight: 0.15,
        }
    }
}

impl From<&crate::config::ScoringConfig> for HeuristicConfig {
    fn from(config: &crate::config::ScoringConfig) -> Self {
        Self {
            length_cap: config.length_cap,
            length_weight: config.length_weight,
            keyword_weight: config.keyword_weight,
            effort_weight: config.effort_weight,
            negative_weight: config.negative_weight,
        }
    }
}

/// Default scoring strategy: substring keyword matching.
#[derive(Debug, Clone, Default)]
pub struct KeywordHeuristic {
    config: HeuristicConfig,
}

impl KeywordHeuristic {
    pub fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    /// Score answers for every category.
    pub fn score_answers<S: AsRef<str>>(
        &self,
        effort: u8,
        answers: &[S],
        flags: &AttachmentFlags,
    ) -> CategoryScores {
        let text = join_answers(answers);
        let lowered = text.to_lowercase();

        let cap = self.config.length_cap.max(1) as f64;
        let length = unit(text.chars().count() as f64 / cap);
        let effort = unit((effort.clamp(1, 5) - 1) as f64 / 4.0);
        let negative = unit(saturate(keyword_hits(&lowered, NEGATIVE_CONFLICT_STEMS)));

        Category::ALL
            .iter()
            .map(|category| {
                let keywords = unit(saturate(keyword_hits(&lowered, stems(*category))));
                let mut raw = self.config.length_weight * length
                    + self.config.keyword_weight * keywords
                    + self.config.effort_weight * effort;

                if *category == Category::ConflictNavigation {
                    raw -= self.config.negative_weight * negative;
                }
                raw += attachment_modifier(flags, *category);

                (*category, unit(raw) * 100.0)
            })
            .collect()
    }
}

impl ScoringStrategy for KeywordHeuristic {
    fn name(&self) -> &str {
        "keyword-heuristic"
    }

    fn score(&self, input: &ReflectionInput) -> CategoryScores {
        self.score_answers(input.effort, &input.answers, &input.attachment)
    }
}

/// Score a questionnaire with the default heuristic.
pub fn score_categories<S: AsRef<str>>(
    effort: u8,
    answers: &[S],
    flags: &AttachmentFlags,
) -> CategoryScores {
    KeywordHeuristic::default().score_answers(effort, answers, flags)
}

fn join_answers<S: AsRef<str>>(answers: &[S]) -> String {
    answers
        .iter()
        .map(|a| a.as_ref().trim())
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Diminishing returns for repeated keyword hits.
fn saturate(count: usize) -> f64 {
    (count as f64 / 3.0).tanh()
}

/// Number of distinct stems present in already-lowercased text.
fn keyword_hits(lowered: &str, stems: &[&str]) -> usize {
    stems.iter().filter(|stem| lowered.contains(*stem)).count()
}

/// Small fixed nudges on the 0-1 scale.
fn attachment_modifier(flags: &AttachmentFlags, category: Category) -> f64 {
    let mut delta = 0.0;
    if flags.secure {
        delta += match category {
            Category::Connection => 0.03,
            Category::Reliability => 0.02,
            _ => 0.0,
        };
    }
    if flags.anxious {
        delta += match category {
            Category::Empathy => 0.02,
            Category::Reliability => -0.03,
            _ => 0.0,
        };
    }
    if flags.avoidant {
        delta += match category {
            Category::Connection => -0.04,
            Category::Communication => -0.02,
            _ => 0.0,
        };
    }
    if flags.disorganized {
        delta += match category {
            Category::ConflictNavigation => -0.02,
            Category::Reliability => -0.02,
            _ => 0.0,
        };
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_answers() -> Vec<String> {
        let mut every_stem: Vec<&str> = Vec::new();
        for category in Category::ALL {
            every_stem.extend_from_slice(stems(category));
        }
        let sentence = every_stem.join(" ");
        vec![sentence.clone(), sentence.clone(), sentence]
    }

    #[test]
    fn test_negative_stems_are_disjoint() {
        for category in Category::ALL {
            for stem in stems(category) {
                assert!(!NEGATIVE_CONFLICT_STEMS.contains(stem));
            }
        }
    }

    #[test]
    fn test_empty_answers_minimum_effort_scores_zero() {
        let empty: Vec<String> = vec![String::new(), "   ".to_string()];
        let scores = score_categories(1, &empty, &AttachmentFlags::default());
        for category in Category::ALL {
            assert_eq!(scores.get(category), 0.0, "{}", category);
        }
    }

    #[test]
    fn test_dense_answers_max_effort_approach_hundred() {
        let flags = AttachmentFlags {
            secure: true,
            ..Default::default()
        };
        let scores = score_categories(5, &dense_answers(), &flags);
        for category in Category::ALL {
            let score = scores.get(category);
            assert!(score <= 100.0, "{} = {}", category, score);
            assert!(score > 95.0, "{} = {}", category, score);
        }
    }

    #[test]
    fn test_scores_within_range_for_mixed_inputs() {
        let inputs = [
            vec!["We yelled and I blamed them, then slammed the door.".to_string()],
            vec!["I ignored the texts".to_string(), "Silent treatment all week".to_string()],
            vec!["x".repeat(2000)],
        ];
        let flag_sets = [
            AttachmentFlags::default(),
            AttachmentFlags {
                avoidant: true,
                disorganized: true,
                ..Default::default()
            },
            AttachmentFlags {
                secure: true,
                anxious: true,
                ..Default::default()
            },
        ];
        for answers in &inputs {
            for flags in &flag_sets {
                for effort in 0..=7 {
                    let scores = score_categories(effort, answers, flags);
                    for category in Category::ALL {
                        let score = scores.get(category);
                        assert!((0.0..=100.0).contains(&score));
                    }
                }
            }
        }
    }

    #[test]
    fn test_keyword_matching_is_case_insensitive() {
        let lower = score_categories(3, &["we talk and listen"], &AttachmentFlags::default());
        let upper = score_categories(3, &["WE TALK AND LISTEN"], &AttachmentFlags::default());
        assert_eq!(lower, upper);
        assert!(lower.get(Category::Communication) > lower.get(Category::Empathy));
    }

    #[test]
    fn test_repeated_keyword_counts_once() {
        let repeated = score_categories(1, &["trust trust trust"], &AttachmentFlags::default());
        let single = score_categories(1, &["trust"], &AttachmentFlags::default());
        // Only the length signal moves.
        let delta = repeated.get(Category::Reliability) - single.get(Category::Reliability);
        let expected = 0.25 * (12.0 / 500.0) * 100.0;
        assert!((delta - expected).abs() < 1e-9);
    }

    #[test]
    fn test_escalation_lowers_conflict_navigation() {
        let calm = score_categories(4, &["We stayed calm and found a compromise"], &AttachmentFlags::default());
        let heated = score_categories(
            4,
            &["We stayed calm and found a compromise after we yelled"],
            &AttachmentFlags::default(),
        );
        assert!(heated.get(Category::ConflictNavigation) < calm.get(Category::ConflictNavigation));
        assert!(heated.get(Category::Communication) >= calm.get(Category::Communication));
    }

    #[test]
    fn test_attachment_modifiers() {
        let answers = ["We spent quality time together"];
        let none = score_categories(3, &answers, &AttachmentFlags::default());

        let secure = AttachmentFlags {
            secure: true,
            ..Default::default()
        };
        let anxious = AttachmentFlags {
            anxious: true,
            ..Default::default()
        };
        let avoidant = AttachmentFlags {
            avoidant: true,
            ..Default::default()
        };
        let disorganized = AttachmentFlags {
            disorganized: true,
            ..Default::default()
        };

        // Expected shift in points for each category, in Category::ALL order:
        // Communication, Empathy, Reliability, Conflict Navigation, Connection.
        let table = [
            (secure, [0.0, 0.0, 2.0, 0.0, 3.0]),
            (anxious, [0.0, 2.0, -3.0, 0.0, 0.0]),
            (avoidant, [-2.0, 0.0, 0.0, 0.0, -4.0]),
            (disorganized, [0.0, 0.0, -2.0, -2.0, 0.0]),
        ];

        for (flags, deltas) in table {
            let flagged = score_categories(3, &answers, &flags);
            for (category, expected) in Category::ALL.iter().zip(deltas) {
                let delta = flagged.get(*category) - none.get(*category);
                assert!(
                    (delta - expected).abs() < 1e-9,
                    "{:?} on {}: got {}, expected {}",
                    flags,
                    category,
                    delta,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let answers = ["I explained how I feel and we made a promise"];
        let flags = AttachmentFlags {
            anxious: true,
            ..Default::default()
        };
        assert_eq!(
            score_categories(4, &answers, &flags),
            score_categories(4, &answers, &flags)
        );
    }

    #[test]
    fn test_custom_length_cap() {
        let heuristic = KeywordHeuristic::new(HeuristicConfig {
            length_cap: 10,
            ..Default::default()
        });
        let scores = heuristic.score_answers(1, &["abcdefghij"], &AttachmentFlags::default());
        assert!((scores.get(Category::Empathy) - 25.0).abs() < 1e-9);
    }
}
