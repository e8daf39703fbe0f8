// src/merge.rs
//
// Finalize-on-advance merge of freshly extracted records into the stored table.
//
// With M = the stored table's highest day:
//   day >  M  appended, ascending
//   day == M  replaces the stored row (the latest day may still be accumulating)
//   day <  M  ignored; history below the newest day is never rewritten
//
// This assumes the site never revises a day once a later day is visible.

use crate::schema::{Record, Table};

#[derive(Clone, Debug, PartialEq)]
pub struct MergeOutcome {
    pub table: Table,
    pub appended: usize,
    /// Latest-day replacements that actually changed a value
    pub updated: usize,
    /// Records below the stored maximum that were left alone
    pub ignored: usize,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        self.appended > 0 || self.updated > 0
    }
}

/// Merge `new` into `existing`. Never fails; empty `new` is a no-op.
/// `new` need not be sorted or unique; for a repeated day the last one wins.
pub fn merge(existing: Table, new: Vec<Record>) -> MergeOutcome {
    let max_day = existing.max_day();
    let mut table = existing;
    let mut appended = 0usize;
    let mut updated = 0usize;
    let mut ignored = 0usize;

    for rec in crate::specs::order_last_wins(new) {
        if rec.day < max_day {
            ignored += 1;
        } else if rec.day == max_day {
            // max_day > 0 here, so the table has a last row with this day
            if let Some(last) = table.last_mut() {
                if !last.same_values(&rec) {
                    logd!("Day {} revised by the site; replacing stored row", rec.day);
                    *last = rec;
                    updated += 1;
                }
            }
        } else {
            table.push(rec);
            appended += 1;
        }
    }

    if ignored > 0 {
        logd!("{ignored} extracted days are below stored day {max_day}; left untouched");
    }
    MergeOutcome { table, appended, updated, ignored }
}
