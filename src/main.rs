//! RelateScore - consent-gated relationship reflections
//!
//! A CLI for recording two-party reflections and viewing the derived
//! Relationship Growth Index dashboard.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, config, store, consent, etc.)

use anyhow::{Context, Result};
use chrono::Utc;
use relatescore::analysis::compute_dashboard_with;
use relatescore::cli::{Args, Command, OutputFormat};
use relatescore::config::{Config, CONFIG_FILE};
use relatescore::error::RelateError;
use relatescore::models::{AttachmentFlags, Party, ReflectionInput};
use relatescore::report::{self, DashboardReport};
use relatescore::scoring::likert::{
    fit_to_questions, likert_rgi, unanswered, DEFAULT_QUESTIONS, SCALE_LABELS,
};
use relatescore::scoring::{build_reflection, HeuristicConfig, KeywordHeuristic};
use relatescore::store::{JsonFileStore, ThreadStore};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("RelateScore v{}", env!("CARGO_PKG_VERSION"));
    debug!("Command: {}", args.command.name());

    // The self-assessment needs neither config nor store
    if let Command::Assess { answers } = &args.command {
        handle_assess(answers);
        return Ok(());
    }

    if let Err(e) = run(args) {
        error!("Command failed: {}", e);
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .relatescore.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the store path, weights, and smoothing.");
    Ok(())
}

/// Handle assess: print each prompt with its answer and the Likert RGI.
fn handle_assess(answers: &[u8]) {
    if answers.len() > DEFAULT_QUESTIONS.len() {
        warn!(
            "Expected {} answers, got {}; ignoring the rest",
            DEFAULT_QUESTIONS.len(),
            answers.len()
        );
    }
    let answers = fit_to_questions(answers, DEFAULT_QUESTIONS.len());

    for (question, answer) in DEFAULT_QUESTIONS.iter().zip(&answers) {
        match *answer {
            0 => println!("• {}\n  (unanswered)", question),
            a => println!("• {}\n  {} - {}", question, a, SCALE_LABELS[usize::from(a - 1)]),
        }
    }

    let skipped = unanswered(&answers);
    if skipped > 0 {
        println!("\n{} of {} questions unanswered (counted as 0)", skipped, answers.len());
    }
    println!("\nRelationship Growth Index (RGI): {} / 100", likert_rgi(&answers));
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch a subcommand against the configured store.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let store = JsonFileStore::open(&config.general.store).with_context(|| {
        format!("Failed to open thread store: {}", config.general.store.display())
    })?;
    debug!("Using store at {}", store.path().display());

    match args.command {
        Command::Create { name_a, name_b } => {
            let thread = store.create_thread(name_a.trim(), name_b.trim())?;
            println!("✅ Created thread for {} & {}", thread.name_a, thread.name_b);
            println!("   Invite code: {}", thread.invite_code);
            println!("   Both parties must consent before reflections are recorded.");
        }

        Command::Consent { code, party, revoke } => {
            let party = Party::from(party);
            let thread = store.set_consent(&code, party, !revoke)?;
            let verb = if revoke { "revoked" } else { "granted" };
            println!(
                "✅ Consent {} for {} (party {})",
                verb,
                thread.display_name(party),
                party
            );
            println!("   Consenting parties: {} of 2", thread.consent_count());
            if thread.is_active() {
                println!("   Thread is active.");
            }
        }

        Command::Reflect {
            code,
            party,
            effort,
            answers,
            attachment,
        } => {
            let attachment = AttachmentFlags::from_names(&attachment).map_err(anyhow::Error::msg)?;
            if answers.iter().all(|a| a.trim().is_empty()) {
                warn!("Reflection has no answer text; only effort will count");
            }

            let strategy = KeywordHeuristic::new(HeuristicConfig::from(&config.scoring));
            let input = ReflectionInput {
                party: Party::from(party),
                effort,
                answers,
                attachment,
            };
            let reflection = build_reflection(&strategy, &config.weights, input, Utc::now())?;
            let rgi = reflection.rgi;
            let scores = reflection.scores.clone();

            let thread = store.append_reflection(&code, reflection)?;

            println!("📝 Reflection recorded ({} total)", thread.reflections.len());
            println!("   RGI: {:.1} / 100", rgi);
            for (category, score) in scores.iter() {
                println!("   - {}: {:.1}", category, score);
            }
        }

        Command::Dashboard {
            code,
            format,
            output,
        } => {
            let thread = store.get_thread(&code)?;
            if !thread.withdrawn && !thread.is_active() {
                return Err(RelateError::ConsentRequired {
                    code,
                    consenting: thread.consent_count(),
                }
                .into());
            }

            let alpha = config.aggregator.ema_alpha;
            let window = config.aggregator.window;
            let snapshot = compute_dashboard_with(&thread.reflections, alpha, window);
            let dashboard = DashboardReport::new(&thread, snapshot, alpha, window);

            let rendered = match format {
                OutputFormat::Json => report::generate_json_report(&dashboard)?,
                OutputFormat::Markdown => report::generate_markdown_report(&dashboard),
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, &rendered)
                        .with_context(|| format!("Failed to write report to {}", path.display()))?;
                    println!("✅ Dashboard saved to: {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Command::Withdraw { code } => {
            store.withdraw(&code)?;
            println!("🗑️  Thread {} withdrawn. All reflections were erased.", code);
            println!("   Create a new invite code to start again.");
        }

        Command::List => {
            let threads = store.list_threads()?;
            if threads.is_empty() {
                println!("No threads yet.");
            }
            for thread in threads {
                let status = if thread.withdrawn {
                    "withdrawn"
                } else if thread.is_active() {
                    "active"
                } else {
                    "awaiting consent"
                };
                println!(
                    "{}  {} & {}  [{}]  {} reflections",
                    thread.invite_code,
                    thread.name_a,
                    thread.name_b,
                    status,
                    thread.reflections.len()
                );
            }
        }

        Command::Assess { answers } => handle_assess(&answers),

        Command::InitConfig => handle_init_config()?,
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
