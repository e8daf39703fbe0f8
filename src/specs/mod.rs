// src/specs/mod.rs
//! # Page specs
//!
//! Each spec knows where the ground truth lives in one kind of page and how
//! to read it into `Record`s:
//!
//! - `table` – an HTML operations table, found by its header row.
//! - `plots` – the per-series plot pages, each with `points: '…'` strings
//!   embedded in a `<script>`.
//!
//! Specs only extract. They do no networking (the session client hands them
//! a `RawPage`) and no persistence or merging.
//!
//! ## Conventions
//! - Case-insensitive tag detection; no whole-document regexes.
//! - A bad cell or row degrades to `None` / a dropped row with a warning.
//!   Only a missing structural marker is an error, since that means the
//!   site changed or the login silently failed.
//! - Output is ascending by day, one record per day, last occurrence wins.
//!
//! Specs are testable offline against canned markup.
use std::collections::BTreeMap;

use crate::error::Result;
use crate::schema::{Field, Record};
use crate::session::RawPage;

pub mod plots;
pub mod table;

/// Raw page → ordered, de-duplicated records with Backlog filled where missing.
pub fn extract(raw: &RawPage) -> Result<Vec<Record>> {
    let mut records = match raw {
        RawPage::Table(doc) => table::extract(doc)?,
        RawPage::Plots(pages) => plots::extract(pages)?,
    };
    fill_backlog(&mut records);
    logf!(
        "Extracted {} days ({}..={})",
        records.len(),
        records.first().map_or(0, |r| r.day),
        records.last().map_or(0, |r| r.day)
    );
    Ok(records)
}

/// Order by day; for repeated days keep the last one seen.
pub(crate) fn order_last_wins(records: impl IntoIterator<Item = Record>) -> Vec<Record> {
    let mut by_day: BTreeMap<u32, Record> = BTreeMap::new();
    for r in records {
        if let Some(prev) = by_day.insert(r.day, r) {
            logd!("Day {} appears more than once; keeping the later row", prev.day);
        }
    }
    by_day.into_values().collect()
}

/// Backlog = cumulative jobs in − cumulative completed jobs over all contracts.
/// Only fills records that have no Backlog of their own; missing inputs count as 0.
pub fn fill_backlog(records: &mut [Record]) {
    const OUT: [Field; 3] = [Field::JobOut0, Field::JobOut1, Field::JobOut2];

    let mut jobs_in = 0.0;
    let mut jobs_out = 0.0;
    for r in records.iter_mut() {
        jobs_in += r.get(Field::JobIn).unwrap_or(0.0);
        jobs_out += OUT.iter().map(|f| r.get(*f).unwrap_or(0.0)).sum::<f64>();
        if r.get(Field::Backlog).is_none() {
            r.set(Field::Backlog, Some(jobs_in - jobs_out));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_occurrence_wins_and_order_is_ascending() {
        let rows = vec![
            Record::new(3).with(Field::Inv, 1.0),
            Record::new(1),
            Record::new(3).with(Field::Inv, 2.0),
            Record::new(2),
        ];
        let out = order_last_wins(rows);
        assert_eq!(out.iter().map(|r| r.day).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(out[2].get(Field::Inv), Some(2.0));
    }

    #[test]
    fn backlog_is_cumulative_and_respects_source_values() {
        let mut rows = vec![
            Record::new(1).with(Field::JobIn, 10.0).with(Field::JobOut0, 4.0),
            Record::new(2).with(Field::JobIn, 5.0).with(Field::JobOut1, 3.0).with(Field::JobOut2, 1.0),
            Record::new(3).with(Field::JobIn, 2.0).with(Field::Backlog, 99.0),
            Record::new(4),
        ];
        fill_backlog(&mut rows);
        assert_eq!(rows[0].get(Field::Backlog), Some(6.0));
        assert_eq!(rows[1].get(Field::Backlog), Some(7.0));
        assert_eq!(rows[2].get(Field::Backlog), Some(99.0));
        assert_eq!(rows[3].get(Field::Backlog), Some(9.0));
    }
}
