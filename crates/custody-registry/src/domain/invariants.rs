//! # Domain Invariants
//!
//! Structural rules that every record and its history must satisfy.
//! The registry maintains them by construction, including timestamp order:
//! a call stamped earlier than the latest history entry is raised to that
//! entry's time. These checks guard state that arrives from outside
//! (snapshots) and back property tests.
//!
//! | Invariant | Check |
//! |-----------|-------|
//! | History is never empty | `check_history_not_empty` |
//! | First entry is the creation entry | `check_creation_entry` |
//! | Each entry continues from the previous owner | `check_custody_chain` |
//! | Last entry matches current owner and status | `check_head_matches_record` |
//! | Timestamps never go backwards | `check_timestamps_monotonic` |
//! | Name non-empty, identities non-null | `check_record_fields` |

use crate::domain::entities::{HistoryEntry, Record, MANUFACTURED_STATUS};
use serde::{Deserialize, Serialize};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// History has at least the creation entry.
#[must_use]
pub fn check_history_not_empty(history: &[HistoryEntry]) -> bool {
    !history.is_empty()
}

/// First entry is `(none -> manufacturer, "Manufactured")` at creation time.
#[must_use]
pub fn check_creation_entry(record: &Record, history: &[HistoryEntry]) -> bool {
    history.first().is_some_and(|first| {
        first.is_creation()
            && first.to == record.manufacturer
            && first.status == MANUFACTURED_STATUS
            && first.timestamp == record.creation_time
    })
}

/// Every later entry starts where the previous one ended.
///
/// Returns the index of the first broken link, if any.
#[must_use]
pub fn check_custody_chain(history: &[HistoryEntry]) -> Option<usize> {
    history
        .windows(2)
        .position(|pair| pair[1].from != Some(pair[0].to))
        .map(|i| i + 1)
}

/// The newest entry agrees with the record's current owner and status.
#[must_use]
pub fn check_head_matches_record(record: &Record, history: &[HistoryEntry]) -> bool {
    history
        .last()
        .is_some_and(|last| last.to == record.current_owner && last.status == record.current_status)
}

/// Timestamps are non-decreasing along the history.
///
/// Returns the index of the first regression, if any.
#[must_use]
pub fn check_timestamps_monotonic(history: &[HistoryEntry]) -> Option<usize> {
    history
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
        .map(|i| i + 1)
}

/// Name is non-empty and no identity is null.
#[must_use]
pub fn check_record_fields(record: &Record, history: &[HistoryEntry]) -> bool {
    !record.name.is_empty()
        && !record.current_status.is_empty()
        && !record.manufacturer.is_zero()
        && !record.current_owner.is_zero()
        && history
            .iter()
            .all(|e| !e.to.is_zero() && !e.status.is_empty() && e.from.map_or(true, |f| !f.is_zero()))
}

/// Check all invariants at once.
#[must_use]
pub fn check_record_invariants(record: &Record, history: &[HistoryEntry]) -> InvariantCheckResult {
    if !check_history_not_empty(history) {
        return InvariantCheckResult::Invalid(vec![InvariantViolation::EmptyHistory]);
    }

    let mut violations = Vec::new();

    if !check_creation_entry(record, history) {
        violations.push(InvariantViolation::CreationEntryMismatch);
    }

    if let Some(index) = history.iter().skip(1).position(HistoryEntry::is_creation) {
        violations.push(InvariantViolation::DuplicateCreationEntry { index: index + 1 });
    }

    if let Some(index) = check_custody_chain(history) {
        violations.push(InvariantViolation::BrokenCustodyChain { index });
    }

    if !check_head_matches_record(record, history) {
        violations.push(InvariantViolation::HeadMismatch);
    }

    if let Some(index) = check_timestamps_monotonic(history) {
        violations.push(InvariantViolation::TimestampRegression { index });
    }

    if !check_record_fields(record, history) {
        violations.push(InvariantViolation::InvalidField);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvariantViolation {
    /// No history entries at all.
    EmptyHistory,
    /// First entry is not the creation entry for this record.
    CreationEntryMismatch,
    /// A creation entry appears after the first position.
    DuplicateCreationEntry {
        /// Position of the extra creation entry.
        index: usize,
    },
    /// Entry `index` does not start from the previous entry's owner.
    BrokenCustodyChain {
        /// Position of the entry that breaks the chain.
        index: usize,
    },
    /// Last entry disagrees with the record's owner or status.
    HeadMismatch,
    /// Entry `index` is older than its predecessor.
    TimestampRegression {
        /// Position of the older entry.
        index: usize,
    },
    /// Empty name/status or a null identity.
    InvalidField,
}

// =============================================================================
// TESTS
// =============================================================================
