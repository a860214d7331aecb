//! Data models for relationship reflection scoring.
//!
//! This module contains the core data structures used throughout the
//! crate: the fixed category set and its weights, reflections, consented
//! threads, and the derived dashboard snapshot.

use crate::error::{RelateError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A scored relational dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Communication,
    Empathy,
    Reliability,
    #[serde(rename = "Conflict Navigation")]
    ConflictNavigation,
    Connection,
}

impl Category {
    /// Every category, in canonical display order.
    pub const ALL: [Category; 5] = [
        Category::Communication,
        Category::Empathy,
        Category::Reliability,
        Category::ConflictNavigation,
        Category::Connection,
    ];

    /// Display name, also used as the JSON key.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Communication => "Communication",
            Category::Empathy => "Empathy",
            Category::Reliability => "Reliability",
            Category::ConflictNavigation => "Conflict Navigation",
            Category::Connection => "Connection",
        }
    }

    /// Chart colour for the RQ wheel.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Communication => "#7ED321",
            Category::Empathy => "#FFD700",
            Category::Reliability => "#20C997",
            Category::ConflictNavigation => "#FF6B6B",
            Category::Connection => "#4A90E2",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match normalized.as_str() {
            "communication" => Ok(Category::Communication),
            "empathy" => Ok(Category::Empathy),
            "reliability" => Ok(Category::Reliability),
            "conflictnavigation" | "conflict" => Ok(Category::ConflictNavigation),
            "connection" => Ok(Category::Connection),
            _ => Err(format!("unknown category: {}", s)),
        }
    }
}

/// Per-category weights for the composite index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    #[serde(default = "default_communication_weight")]
    pub communication: f64,
    #[serde(default = "default_empathy_weight")]
    pub empathy: f64,
    #[serde(default = "default_reliability_weight")]
    pub reliability: f64,
    #[serde(default = "default_conflict_navigation_weight")]
    pub conflict_navigation: f64,
    #[serde(default = "default_connection_weight")]
    pub connection: f64,
}

fn default_communication_weight() -> f64 {
    0.25
}

fn default_empathy_weight() -> f64 {
    0.20
}

fn default_reliability_weight() -> f64 {
    0.20
}

fn default_conflict_navigation_weight() -> f64 {
    0.20
}

fn default_connection_weight() -> f64 {
    0.15
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self::canonical()
    }
}

impl CategoryWeights {
    /// The canonical weight table. Sums to 1.
    pub fn canonical() -> Self {
        Self {
            communication: default_communication_weight(),
            empathy: default_empathy_weight(),
            reliability: default_reliability_weight(),
            conflict_navigation: default_conflict_navigation_weight(),
            connection: default_connection_weight(),
        }
    }

    /// Weight for a single category.
    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::Communication => self.communication,
            Category::Empathy => self.empathy,
            Category::Reliability => self.reliability,
            Category::ConflictNavigation => self.conflict_navigation,
            Category::Connection => self.connection,
        }
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        Category::ALL.iter().map(|c| self.weight(*c)).sum()
    }

    /// Check that every weight is finite and non-negative and the table sums to 1.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(c) = Category::ALL.iter().find(|c| !self.weight(**c).is_finite()) {
            return Err(format!("Weight for {} must be a finite number", c));
        }
        if let Some(c) = Category::ALL.iter().find(|c| self.weight(**c) < 0.0) {
            return Err(format!("Weight for {} must be non-negative", c));
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("Category weights must sum to 1 (got {:.4})", sum));
        }
        Ok(())
    }
}

/// Raw per-category scores on the 0-100 scale.
///
/// Missing or `null` categories read as 0 and unknown keys in stored
/// documents are dropped, so older record shapes still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Option<f64>>", into = "BTreeMap<String, f64>")]
pub struct CategoryScores(BTreeMap<Category, f64>);

impl CategoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score for a category, 0 when absent.
    pub fn get(&self, category: Category) -> f64 {
        self.0.get(&category).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, category: Category, score: f64) {
        self.0.insert(category, score);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().map(|(c, s)| (*c, *s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Category, f64)> for CategoryScores {
    fn from_iter<I: IntoIterator<Item = (Category, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Option<f64>>> for CategoryScores {
    fn from(raw: BTreeMap<String, Option<f64>>) -> Self {
        raw.into_iter()
            .filter_map(|(k, v)| k.parse::<Category>().ok().map(|c| (c, v.unwrap_or(0.0))))
            .collect()
    }
}

impl From<CategoryScores> for BTreeMap<String, f64> {
    fn from(scores: CategoryScores) -> Self {
        scores
            .0
            .into_iter()
            .map(|(c, v)| (c.name().to_string(), v))
            .collect()
    }
}

/// Self-reported attachment tendencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentFlags {
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub anxious: bool,
    #[serde(default)]
    pub avoidant: bool,
    #[serde(default)]
    pub disorganized: bool,
}

impl AttachmentFlags {
    /// Build flags from a list of names, rejecting unknown ones.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> std::result::Result<Self, String> {
        let mut flags = Self::default();
        for name in names {
            match name.as_ref().trim().to_lowercase().as_str() {
                "secure" => flags.secure = true,
                "anxious" => flags.anxious = true,
                "avoidant" => flags.avoidant = true,
                "disorganized" | "disorganised" => flags.disorganized = true,
                other => return Err(format!("unknown attachment flag: {}", other)),
            }
        }
        Ok(flags)
    }
}

/// One side of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    A,
    B,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::A => write!(f, "a"),
            Party::B => write!(f, "b"),
        }
    }
}

/// Everything a scoring strategy needs from a submitted questionnaire.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionInput {
    pub party: Party,
    /// Effort rating, 1-5.
    pub effort: u8,
    pub answers: Vec<String>,
    pub attachment: AttachmentFlags,
}

/// One submitted questionnaire response. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub timestamp: DateTime<Utc>,
    pub party: Party,
    pub effort: u8,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub attachment: AttachmentFlags,
    #[serde(default)]
    pub scores: CategoryScores,
    /// Composite Relationship Growth Index.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub rgi: f64,
}

/// Serde writes non-finite floats as `null`; read those back as 0.
fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl Reflection {
    pub fn new(
        timestamp: DateTime<Utc>,
        input: ReflectionInput,
        scores: CategoryScores,
        rgi: f64,
    ) -> Self {
        Self {
            timestamp,
            party: input.party,
            effort: input.effort,
            answers: input.answers,
            attachment: input.attachment,
            scores,
            rgi,
        }
    }
}

/// A consented pairing between two parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub name_a: String,
    pub name_b: String,
    #[serde(default)]
    pub consent: BTreeMap<Party, bool>,
    #[serde(default)]
    pub withdrawn: bool,
    #[serde(default)]
    pub reflections: Vec<Reflection>,
    #[serde(default)]
    pub toxicity_triggers: u32,
}

impl Thread {
    /// Creates a thread with no consent recorded yet.
    pub fn new(invite_code: String, name_a: String, name_b: String, created_at: DateTime<Utc>) -> Self {
        Self {
            invite_code,
            created_at,
            name_a,
            name_b,
            consent: BTreeMap::new(),
            withdrawn: false,
            reflections: Vec::new(),
            toxicity_triggers: 0,
        }
    }

    /// Number of parties with an active consent flag.
    pub fn consent_count(&self) -> usize {
        self.consent.values().filter(|granted| **granted).count()
    }

    /// Both parties consented and the thread was never withdrawn.
    pub fn is_active(&self) -> bool {
        !self.withdrawn && self.consent_count() >= 2
    }

    pub fn display_name(&self, party: Party) -> &str {
        match party {
            Party::A => &self.name_a,
            Party::B => &self.name_b,
        }
    }

    /// Grant or revoke one party's consent.
    pub fn set_consent(&mut self, party: Party, granted: bool) -> Result<()> {
        if self.withdrawn {
            return Err(RelateError::ThreadWithdrawn {
                code: self.invite_code.clone(),
            });
        }
        self.consent.insert(party, granted);
        Ok(())
    }

    /// Append a reflection. Requires dual consent.
    pub fn append_reflection(&mut self, reflection: Reflection) -> Result<()> {
        if self.withdrawn {
            return Err(RelateError::ThreadWithdrawn {
                code: self.invite_code.clone(),
            });
        }
        if self.consent_count() < 2 {
            return Err(RelateError::ConsentRequired {
                code: self.invite_code.clone(),
                consenting: self.consent_count(),
            });
        }
        self.reflections.push(reflection);
        Ok(())
    }

    /// Terminal transition: drop every reflection and all consent.
    pub fn withdraw(&mut self) {
        self.reflections.clear();
        self.consent.clear();
        self.withdrawn = true;
    }
}

/// Point and trend figures for one series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Outlier-dampened summary of the recent window.
    pub point: f64,
    /// Exponential moving average over the full history.
    pub trend: f64,
}

/// Derived dashboard figures for a thread. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub composite: Estimate,
    pub categories: BTreeMap<Category, Estimate>,
    pub count: usize,
}

impl DashboardSnapshot {
    /// All-zero snapshot with every category present.
    pub fn empty() -> Self {
        Self {
            composite: Estimate::default(),
            categories: Category::ALL
                .iter()
                .map(|c| (*c, Estimate::default()))
                .collect(),
            count: 0,
        }
    }

    pub fn category(&self, category: Category) -> Estimate {
        self.categories.get(&category).copied().unwrap_or_default()
    }
}
