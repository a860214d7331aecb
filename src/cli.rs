//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Party;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// RelateScore - consent-gated relationship reflections
///
/// Record reflections for a two-party thread once both sides consent,
/// then view an outlier-dampened Relationship Growth Index dashboard.
///
/// Examples:
///   relatescore create --name-a Ana --name-b Ben
///   relatescore consent RS-ABCD2345 --party a
///   relatescore reflect RS-ABCD2345 --party a --effort 4 --answer "We talked calmly"
///   relatescore dashboard RS-ABCD2345 --format json
///   relatescore assess --answers 4,5,3
///   relatescore init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .relatescore.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Path of the JSON thread store
    #[arg(long, value_name = "FILE", env = "RELATESCORE_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Reflections considered for the point estimate
    #[arg(long, value_name = "COUNT", global = true)]
    pub window: Option<usize>,

    /// EMA smoothing factor for the trend (0.0 - 1.0)
    #[arg(long, value_name = "ALPHA", global = true)]
    pub alpha: Option<f64>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a thread and print its invite code
    Create {
        /// Display name for party A
        #[arg(long)]
        name_a: String,
        /// Display name for party B
        #[arg(long)]
        name_b: String,
    },

    /// Grant (or revoke) one party's consent
    Consent {
        /// Invite code
        code: String,
        #[arg(long)]
        party: PartyArg,
        /// Revoke instead of grant
        #[arg(long)]
        revoke: bool,
    },

    /// Score and record a reflection
    Reflect {
        /// Invite code
        code: String,
        #[arg(long)]
        party: PartyArg,
        /// Effort rating (1-5)
        #[arg(long)]
        effort: u8,
        /// Free-text answer; repeat for several
        #[arg(long = "answer", value_name = "TEXT")]
        answers: Vec<String>,
        /// Attachment flags (comma-separated: secure, anxious, avoidant, disorganized)
        #[arg(long, value_name = "FLAGS", value_delimiter = ',')]
        attachment: Vec<String>,
    },

    /// Show the dashboard for a thread
    Dashboard {
        /// Invite code
        code: String,
        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,
        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Withdraw consent and erase every reflection in a thread
    Withdraw {
        /// Invite code
        code: String,
    },

    /// List threads in the store
    List,

    /// Quick Likert self-assessment (answers 1-5)
    Assess {
        /// Comma-separated answers, one per question
        #[arg(long, value_delimiter = ',', required = true)]
        answers: Vec<u8>,
    },

    /// Generate a default .relatescore.toml configuration file
    InitConfig,
}

impl Command {
    /// Subcommand name as typed on the command line.
    ///
    /// Safe to log: unlike the `Debug` output it carries no answer text.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Consent { .. } => "consent",
            Command::Reflect { .. } => "reflect",
            Command::Dashboard { .. } => "dashboard",
            Command::Withdraw { .. } => "withdraw",
            Command::List => "list",
            Command::Assess { .. } => "assess",
            Command::InitConfig => "init-config",
        }
    }
}

/// Output format for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Party selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PartyArg {
    A,
    B,
}

impl From<PartyArg> for Party {
    fn from(arg: PartyArg) -> Self {
        match arg {
            PartyArg::A => Party::A,
            PartyArg::B => Party::B,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(alpha) = self.alpha {
            if !(0.0..=1.0).contains(&alpha) {
                return Err("Alpha must be between 0.0 and 1.0".to_string());
            }
        }

        if self.window == Some(0) {
            return Err("Window must be at least 1".to_string());
        }

        match &self.command {
            Command::Create { name_a, name_b } => {
                if name_a.trim().is_empty() || name_b.trim().is_empty() {
                    return Err("Both display names are required".to_string());
                }
            }
            Command::Reflect { effort, .. } => {
                if !(1..=5).contains(effort) {
                    return Err("Effort must be between 1 and 5".to_string());
                }
            }
            Command::Assess { answers } => {
                if answers.iter().any(|a| !(1..=5).contains(a)) {
                    return Err("Assessment answers must be between 1 and 5".to_string());
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Command) -> Args {
        Args {
            command,
            config: None,
            store: None,
            window: None,
            alpha: None,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_parse_reflect() {
        let args = Args::try_parse_from([
            "relatescore",
            "reflect",
            "RS-ABCD2345",
            "--party",
            "b",
            "--effort",
            "4",
            "--answer",
            "We talked",
            "--answer",
            "I listened",
            "--attachment",
            "secure,anxious",
        ])
        .unwrap();

        match args.command {
            Command::Reflect {
                code,
                party,
                effort,
                answers,
                attachment,
            } => {
                assert_eq!(code, "RS-ABCD2345");
                assert_eq!(Party::from(party), Party::B);
                assert_eq!(effort, 4);
                assert_eq!(answers.len(), 2);
                assert_eq!(attachment, vec!["secure", "anxious"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_command_name_omits_answers() {
        let args = Args::try_parse_from([
            "relatescore",
            "reflect",
            "RS-X",
            "--party",
            "a",
            "--effort",
            "3",
            "--answer",
            "something private",
        ])
        .unwrap();
        assert_eq!(args.command.name(), "reflect");

        let args = Args::try_parse_from(["relatescore", "init-config"]).unwrap();
        assert_eq!(args.command.name(), "init-config");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["relatescore", "dashboard", "RS-X", "--alpha", "0.3", "-v"])
                .unwrap();
        assert_eq!(args.alpha, Some(0.3));
        assert!(args.verbose);
    }

    #[test]
    fn test_validation_effort_range() {
        let args = make_args(Command::Reflect {
            code: "RS-X".to_string(),
            party: PartyArg::A,
            effort: 6,
            answers: Vec::new(),
            attachment: Vec::new(),
        });
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(Command::List);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_alpha_and_window() {
        let mut args = make_args(Command::List);
        args.alpha = Some(1.5);
        assert!(args.validate().is_err());

        let mut args = make_args(Command::List);
        args.window = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(Command::List);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
