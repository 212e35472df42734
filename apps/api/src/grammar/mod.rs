//! Grammar Check Adapter — wraps the external grammar engine behind a shared
//! call budget and turns its raw matches into reportable issues.
//!
//! The engine is reached only through `GrammarChecker`; the budget only
//! through `CallBudget`. Both are injected so tests can script them.

pub mod languagetool;
pub mod rate_limit;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::normalizer::NormalizedDocument;
use crate::errors::AppError;
use rate_limit::CallBudget;

/// Only this many matches become `GrammarIssue` records; scoring uses them all.
pub const MAX_REPORTED_ISSUES: usize = 5;
/// UTF-16 code units of surrounding text kept on each side of a flagged span.
pub const CONTEXT_PADDING: usize = 10;
/// Fallback retry hint when the upstream engine throttles without saying for how long.
const DEFAULT_UPSTREAM_RETRY_SECS: u64 = 60;

/// One raw match from the grammar engine. `offset` and `length` count UTF-16
/// code units, as LanguageTool reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarMatch {
    pub message: String,
    pub offset: usize,
    pub length: usize,
    pub replacements: Vec<String>,
    pub rule_id: String,
}

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Grammar API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Grammar engine throttled the request")]
    Throttled { retry_after_secs: Option<u64> },

    #[error("Grammar engine does not support language '{0}'")]
    UnsupportedLanguage(String),
}

/// The external grammar-checking capability.
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    async fn check(&self, text: &str) -> Result<Vec<GrammarMatch>, GrammarError>;

    /// Provider credit to surface alongside results, if any.
    fn attribution(&self) -> Option<&str> {
        None
    }
}

/// A reportable grammar issue with surrounding context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrammarIssue {
    pub message: String,
    pub suggestion: Option<String>,
    pub error_word: String,
    pub context: String,
    pub rule_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrammarReport {
    /// Every match the engine returned. Drives the grammar subscore.
    pub total_matches: usize,
    /// The first `MAX_REPORTED_ISSUES` matches, in engine order.
    pub issues: Vec<GrammarIssue>,
}

/// Budget-aware front door to the grammar engine.
#[derive(Clone)]
pub struct GrammarAdapter {
    checker: Arc<dyn GrammarChecker>,
    budget: Arc<dyn CallBudget>,
}

impl GrammarAdapter {
    pub fn new(checker: Arc<dyn GrammarChecker>, budget: Arc<dyn CallBudget>) -> Self {
        Self { checker, budget }
    }

    pub fn attribution(&self) -> Option<String> {
        self.checker.attribution().map(String::from)
    }

    /// Checks the document. An empty document has nothing to flag and does not
    /// spend budget. A spent budget fails with `RateLimitExceeded`; no grammar
    /// result is ever fabricated.
    pub async fn check(&self, doc: &NormalizedDocument) -> Result<GrammarReport, AppError> {
        if doc.is_empty() {
            debug!("Empty document, skipping grammar check");
            return Ok(GrammarReport::default());
        }

        if !self.budget.try_acquire() {
            let retry_after_secs = ceil_secs(self.budget.retry_after());
            warn!("Grammar call budget exhausted ({retry_after_secs}s until next slot)");
            return Err(AppError::RateLimitExceeded { retry_after_secs });
        }

        let matches = self
            .checker
            .check(doc.as_str())
            .await
            .map_err(|e| match e {
                GrammarError::Throttled { retry_after_secs } => {
                    warn!("Grammar engine throttled the request upstream");
                    AppError::RateLimitExceeded {
                        retry_after_secs: retry_after_secs.unwrap_or(DEFAULT_UPSTREAM_RETRY_SECS),
                    }
                }
                other => {
                    AppError::Internal(anyhow::Error::new(other).context("Grammar check failed"))
                }
            })?;

        debug!("Grammar engine returned {} matches", matches.len());
        Ok(build_report(doc, &matches))
    }
}

/// Translates raw matches into a report: full count, top issues with context.
pub fn build_report(doc: &NormalizedDocument, matches: &[GrammarMatch]) -> GrammarReport {
    let text = doc.as_str();
    let issues = matches
        .iter()
        .take(MAX_REPORTED_ISSUES)
        .map(|m| GrammarIssue {
            message: m.message.clone(),
            suggestion: m.replacements.first().cloned(),
            error_word: utf16_slice(text, m.offset, m.offset.saturating_add(m.length))
                .to_string(),
            context: context_window(text, m.offset, m.length).to_string(),
            rule_id: m.rule_id.clone(),
        })
        .collect();

    GrammarReport {
        total_matches: matches.len(),
        issues,
    }
}

/// Up to `CONTEXT_PADDING` characters either side of the span, clipped to the text.
pub fn context_window(text: &str, offset: usize, length: usize) -> &str {
    let start = offset.saturating_sub(CONTEXT_PADDING);
    let end = offset
        .saturating_add(length)
        .saturating_add(CONTEXT_PADDING);
    utf16_slice(text, start, end)
}

/// Slices `text` by UTF-16 code-unit positions, clipping both ends to its length.
/// A position inside a surrogate pair moves forward to the next character.
fn utf16_slice(text: &str, start: usize, end: usize) -> &str {
    let start = utf16_to_byte(text, start);
    let end = utf16_to_byte(text, end).max(start);
    &text[start..end]
}

fn utf16_to_byte(text: &str, pos: usize) -> usize {
    let mut units = 0;
    for (byte, c) in text.char_indices() {
        if units >= pos {
            return byte;
        }
        units += c.len_utf16();
    }
    text.len()
}

fn ceil_secs(d: Duration) -> u64 {
    (d.as_secs() + u64::from(d.subsec_nanos() > 0)).max(1)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Grammar engine stand-in that replays a fixed match list and counts calls.
    pub struct ScriptedChecker {
        matches: Mutex<Vec<GrammarMatch>>,
        calls: AtomicUsize,
        throttled: AtomicBool,
    }

    impl ScriptedChecker {
        pub fn returning(matches: Vec<GrammarMatch>) -> Self {
            Self {
                matches: Mutex::new(matches),
                calls: AtomicUsize::new(0),
                throttled: AtomicBool::new(false),
            }
        }

        pub fn throttled() -> Self {
            let checker = Self::returning(vec![]);
            checker.throttled.store(true, Ordering::SeqCst);
            checker
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GrammarChecker for ScriptedChecker {
        async fn check(&self, _text: &str) -> Result<Vec<GrammarMatch>, GrammarError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.throttled.load(Ordering::SeqCst) {
                return Err(GrammarError::Throttled {
                    retry_after_secs: None,
                });
            }
            Ok(self.matches.lock().unwrap().clone())
        }

        fn attribution(&self) -> Option<&str> {
            Some("Scripted grammar engine")
        }
    }

    /// Budget with a fixed number of remaining calls.
    pub struct FixedBudget {
        remaining: AtomicUsize,
    }

    impl FixedBudget {
        pub fn new(calls: usize) -> Self {
            Self {
                remaining: AtomicUsize::new(calls),
            }
        }
    }

    impl CallBudget for FixedBudget {
        fn try_acquire(&self) -> bool {
            self.remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }

        fn retry_after(&self) -> Duration {
            Duration::from_secs(60)
        }
    }

    pub fn grammar_match(offset: usize, length: usize, rule_id: &str) -> GrammarMatch {
        GrammarMatch {
            message: format!("Possible problem ({rule_id})"),
            offset,
            length,
            replacements: vec![],
            rule_id: rule_id.to_string(),
        }
    }
}
