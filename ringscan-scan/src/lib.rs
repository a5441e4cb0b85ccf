//! Concurrent page scanning.
//!
//! - [`task::fetch_and_extract`]: one URL to one [`PageResult`]
//! - [`Scanner`]: fan-out over a URL list, joined back in input order
//! - [`ScanError`]: per-page failure, recorded instead of propagated
//!
//! The result set always has one entry per input URL, positioned like the
//! input, whether that page produced numbers, nothing, or an error.
use ringscan_extract::{NormalizePolicy, NormalizedNumber, RawMatch};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;

mod error;
pub mod orchestrator;
pub mod task;

pub use error::ScanError;
pub use orchestrator::{Scanner, run};

/// Knobs shared read-only by every page task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    /// Upper bound for one page, connect to last body byte.
    pub timeout: Duration,
    pub policy: NormalizePolicy,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            policy: NormalizePolicy::Strict,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Phones {
        phones: BTreeSet<NormalizedNumber>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        rejected: Vec<RawMatch>,
    },
    Failed {
        error: ScanError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    pub url: String,
    #[serde(flatten)]
    pub outcome: PageOutcome,
}

impl PageResult {
    pub fn failed(url: impl Into<String>, error: ScanError) -> Self {
        Self {
            url: url.into(),
            outcome: PageOutcome::Failed { error },
        }
    }

    /// The page's numbers, or `None` if it failed.
    pub fn phones(&self) -> Option<&BTreeSet<NormalizedNumber>> {
        match &self.outcome {
            PageOutcome::Phones { phones, .. } => Some(phones),
            PageOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ScanError> {
        match &self.outcome {
            PageOutcome::Phones { .. } => None,
            PageOutcome::Failed { error } => Some(error),
        }
    }
}

/// Totals over a finished result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub pages: usize,
    pub failed: usize,
    /// Sum of per-page set sizes; a number on two pages counts twice.
    pub numbers: usize,
}

impl ScanSummary {
    pub fn from_results(results: &[PageResult]) -> Self {
        results.iter().fold(
            Self {
                pages: results.len(),
                ..Self::default()
            },
            |mut acc, page| {
                match page.phones() {
                    Some(phones) => acc.numbers += phones.len(),
                    None => acc.failed += 1,
                }
                acc
            },
        )
    }
}
