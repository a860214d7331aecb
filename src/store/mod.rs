//! Thread persistence.
//!
//! Threads live in a single JSON document. Every mutation is one
//! load-modify-save transaction, and saves go through a temporary file in
//! the same directory that is renamed over the target, so a reader only
//! ever sees a complete document.
//!
//! The file is not locked. Only one process may write the store at a time:
//! two overlapping transactions both start from the same snapshot, and the
//! later save silently discards the other's change (a concurrent `reflect`
//! can resurrect reflections that a `withdraw` just erased).

use crate::error::{RelateError, Result};
use crate::models::{Party, Reflection, Thread};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Storage operations for consented threads.
pub trait ThreadStore {
    /// Create a thread under a fresh invite code.
    fn create_thread(&self, name_a: &str, name_b: &str) -> Result<Thread>;

    fn get_thread(&self, code: &str) -> Result<Thread>;

    fn list_threads(&self) -> Result<Vec<Thread>>;

    fn set_consent(&self, code: &str, party: Party, granted: bool) -> Result<Thread>;

    /// Append a reflection; fails unless both parties consent.
    fn append_reflection(&self, code: &str, reflection: Reflection) -> Result<Thread>;

    /// Clear the thread's reflections and mark it withdrawn for good.
    fn withdraw(&self, code: &str) -> Result<Thread>;
}

/// On-disk document shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadDocument {
    #[serde(default)]
    pub threads: BTreeMap<String, Thread>,
}

/// [`ThreadStore`] backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open a store, creating the file (and parent directories) if absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };

        if let Some(parent) = store.dir() {
            fs::create_dir_all(parent)?;
        }
        if !store.path.exists() {
            info!("Creating thread store at {}", store.path.display());
            store.save(&ThreadDocument::default())?;
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    /// Read the whole document.
    pub fn load(&self) -> Result<ThreadDocument> {
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ThreadDocument::default());
        }
        let document: ThreadDocument = serde_json::from_str(&content)?;
        debug!(
            "Loaded {} threads from {}",
            document.threads.len(),
            self.path.display()
        );
        Ok(document)
    }

    /// Replace the whole document.
    pub fn save(&self, document: &ThreadDocument) -> Result<()> {
        let dir = self.dir().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, document)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!(
            "Saved {} threads to {}",
            document.threads.len(),
            self.path.display()
        );
        Ok(())
    }

    fn update<F>(&self, code: &str, mutate: F) -> Result<Thread>
    where
        F: FnOnce(&mut Thread) -> Result<()>,
    {
        let mut document = self.load()?;
        let thread = document
            .threads
            .get_mut(code)
            .ok_or_else(|| RelateError::ThreadNotFound {
                code: code.to_string(),
            })?;

        mutate(thread)?;
        let updated = thread.clone();
        self.save(&document)?;
        Ok(updated)
    }
}

impl ThreadStore for JsonFileStore {
    fn create_thread(&self, name_a: &str, name_b: &str) -> Result<Thread> {
        let mut document = self.load()?;
        let now = Utc::now();
        let seed = now.timestamp_nanos_opt().unwrap_or_default() as u64;

        let code = (0u64..)
            .map(|attempt| invite_code(seed, attempt))
            .find(|code| !document.threads.contains_key(code))
            .unwrap_or_default();

        let thread = Thread::new(code.clone(), name_a.to_string(), name_b.to_string(), now);
        document.threads.insert(code.clone(), thread.clone());
        self.save(&document)?;

        info!("Created thread {}", code);
        Ok(thread)
    }

    fn get_thread(&self, code: &str) -> Result<Thread> {
        self.load()?
            .threads
            .remove(code)
            .ok_or_else(|| RelateError::ThreadNotFound {
                code: code.to_string(),
            })
    }

    fn list_threads(&self) -> Result<Vec<Thread>> {
        Ok(self.load()?.threads.into_values().collect())
    }

    fn set_consent(&self, code: &str, party: Party, granted: bool) -> Result<Thread> {
        let thread = self.update(code, |thread| thread.set_consent(party, granted))?;
        info!(
            "Consent for party {} on {} set to {} ({} of 2)",
            party,
            code,
            granted,
            thread.consent_count()
        );
        Ok(thread)
    }

    fn append_reflection(&self, code: &str, reflection: Reflection) -> Result<Thread> {
        let thread = self.update(code, |thread| thread.append_reflection(reflection))?;
        debug!("Thread {} now has {} reflections", code, thread.reflections.len());
        Ok(thread)
    }

    fn withdraw(&self, code: &str) -> Result<Thread> {
        let thread = self.update(code, |thread| {
            thread.withdraw();
            Ok(())
        })?;
        info!("Thread {} withdrawn; reflections cleared", code);
        Ok(thread)
    }
}

const CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 8;

/// `RS-` followed by eight characters from an unambiguous base-32 alphabet.
fn invite_code(seed: u64, attempt: u64) -> String {
    let mut n = (seed ^ attempt.wrapping_mul(0x2545_F491_4F6C_DD1D))
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        >> 16;

    let mut code = String::from("RS-");
    for _ in 0..CODE_LENGTH {
        code.push(CODE_ALPHABET[(n % 32) as usize] as char);
        n /= 32;
    }
    code
}
