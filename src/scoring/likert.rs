//! Quick 1-5 Likert self-assessment.

/// Default assessment prompts.
pub const DEFAULT_QUESTIONS: [&str; 3] = [
    "How often do you communicate openly?",
    "How do you handle conflict in close relationships?",
    "How accurately do you believe you understand others' emotions?",
];

/// Scale labels, indexed by answer - 1.
pub const SCALE_LABELS: [&str; 5] = [
    "Almost never",
    "Rarely",
    "Sometimes",
    "Often",
    "Almost always",
];

/// Growth index from Likert answers.
///
/// Answers are 1-5 with 0 meaning unanswered; values above 5 count as 5.
/// Returns `floor(sum / (len * 5) * 100)`, or 0 with no answers.
pub fn likert_rgi(answers: &[u8]) -> u32 {
    let total: u32 = answers.iter().map(|a| u32::from((*a).min(5))).sum();
    let max_possible = (answers.len() as u32 * 5).max(1);
    total * 100 / max_possible
}

/// Number of prompts still unanswered.
pub fn unanswered(answers: &[u8]) -> usize {
    answers.iter().filter(|a| **a == 0).count()
}

/// One answer per question: missing trailing answers become 0, extras are dropped.
pub fn fit_to_questions(answers: &[u8], questions: usize) -> Vec<u8> {
    let mut fitted: Vec<u8> = answers.iter().copied().take(questions).collect();
    fitted.resize(questions, 0);
    fitted
}
