//! Entry number format.
//!
//! Numbers look like `JE-YYYYMMDD-NNN`: a per-company, per-day sequence,
//! zero-padded to three digits. Sequences above 999 keep growing
//! (`JE-20240105-1000`). Allocation itself is the store's job and must be
//! atomic; this module only formats and orders numbers.

use std::cmp::Ordering;

use chrono::NaiveDate;

const PREFIX: &str = "JE-";

/// An entry number: a day and its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryNumber {
    /// Day the number belongs to.
    pub date: NaiveDate,
    /// 1-based sequence within the day.
    pub sequence: u32,
}

impl EntryNumber {
    /// Creates an entry number.
    #[must_use]
    pub const fn new(date: NaiveDate, sequence: u32) -> Self {
        Self { date, sequence }
    }

    /// Returns the day prefix shared by all numbers of `date`, e.g. `JE-20240105-`.
    #[must_use]
    pub fn day_prefix(date: NaiveDate) -> String {
        format!("{PREFIX}{}-", date.format("%Y%m%d"))
    }
}

impl std::fmt::Display for EntryNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{PREFIX}{}-{:03}",
            self.date.format("%Y%m%d"),
            self.sequence
        )
    }
}

/// Orders entry numbers naturally: shorter numbers first, then lexically.
///
/// Within one day this puts `…-999` before `…-1000`.
#[must_use]
pub fn compare_entry_numbers(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
