// src/specs/plots.rs
//! Spec for the per-series plot pages (`Plot?data=<LABEL>&x=all`).
//!
//! Each page draws its chart from a script like
//!
//! ```text
//! points: '1 9480 2 9360 3 9300 …'
//! ```
//!
//! i.e. alternating `day value` tokens. Contract series (`JOBT`, `JOBREV`,
//! `JOBOUT`) have one `points` string per contract, in contract order.
//! Inventory pages also plot arrivals at fractional days; those are not
//! table rows and are dropped.

use std::collections::BTreeMap;

use crate::core::html::{self, Markup};
use crate::core::sanitize::day_from_f64;
use crate::error::{Error, Result};
use crate::schema::{Field, Record};
use crate::session::PlotPage;

/// Series label and how many `points` strings its page should carry.
pub const SERIES: &[(&str, usize)] = &[
    ("INV", 1),
    ("CASH", 1),
    ("JOBIN", 1),
    ("JOBQ", 1),
    ("S1Q", 1),
    ("S2Q", 1),
    ("S3Q", 1),
    ("S1UTIL", 1),
    ("S2UTIL", 1),
    ("S3UTIL", 1),
    ("JOBT", 3),
    ("JOBREV", 3),
    ("JOBOUT", 3),
];

pub fn extract(pages: &[PlotPage]) -> Result<Vec<Record>> {
    let mut by_day: BTreeMap<u32, Record> = BTreeMap::new();
    let mut fractional = 0usize;

    for (label, expected) in SERIES {
        let page = pages
            .iter()
            .find(|p| p.label.eq_ignore_ascii_case(label))
            .ok_or_else(|| Error::Parse(format!("series {label}: page missing from report")))?;

        let series = parse_doc(&page.html)
            .ok_or_else(|| Error::Parse(format!("series {label}: no script with points data")))?;

        if series.len() < *expected {
            logw!(
                "Series {label}: expected {expected} points strings, found {}; missing ones left empty",
                series.len()
            );
        }

        for (idx, points) in series.iter().take(*expected).enumerate() {
            let Some(field) = field_for(label, idx) else { continue };
            for &(day, value) in points {
                match day_from_f64(day) {
                    Some(d) => by_day.entry(d).or_insert_with(|| Record::new(d)).set(field, Some(value)),
                    None => fractional += 1,
                }
            }
        }
    }

    if fractional > 0 {
        logd!("Skipped {fractional} points at non-integer days");
    }
    Ok(by_day.into_values().collect())
}

fn field_for(label: &str, idx: usize) -> Option<Field> {
    Field::ALL
        .into_iter()
        .find(|f| f.plot_series().is_some_and(|(l, i)| l == label && i == idx))
}

/// Every `points` string in the first script that has one, as `(day, value)`
/// pairs. `None` when no script carries points data.
pub fn parse_doc(doc: &str) -> Option<Vec<Vec<(f64, f64)>>> {
    let page = Markup::new(doc);
    let script = page
        .blocks("script")
        .into_iter()
        .map(html::inner_after_open_tag)
        .find(|s| s.contains("points:"))?;

    Some(points_strings(script).into_iter().map(parse_points).collect())
}

/// Contents of each `points: '…'` (or `"…"`) literal, in order. Empty
/// literals are kept so contract positions line up.
fn points_strings(script: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = script;
    while let Some(at) = rest.find("points:") {
        rest = rest[at + "points:".len()..].trim_start();
        let Some(q) = rest.chars().next().filter(|c| *c == '\'' || *c == '"') else { continue };
        let body = &rest[1..];
        match body.find(q) {
            Some(end) => {
                out.push(&body[..end]);
                rest = &body[end + 1..];
            }
            None => break,
        }
    }
    out
}

/// `"1 9480 2 9360"` → `[(1.0, 9480.0), (2.0, 9360.0)]`. Unparseable pairs are skipped.
fn parse_points(s: &str) -> Vec<(f64, f64)> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    tokens
        .chunks_exact(2)
        .filter_map(|pair| Some((pair[0].parse().ok()?, pair[1].parse().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_strings_in_order() {
        let js = "var a = { points: '1 2 3 4', color: 'x' }; var b = {points:\"5 6\"}; points: '' ";
        assert_eq!(points_strings(js), vec!["1 2 3 4", "5 6", ""]);
    }

    #[test]
    fn bad_pairs_are_skipped() {
        assert_eq!(parse_points("1 10 x 20 3 30.5 4"), vec![(1.0, 10.0), (3.0, 30.5)]);
    }

    #[test]
    fn no_script_means_none() {
        assert!(parse_doc("<html><script>var x = 1;</script></html>").is_none());
        let doc = "<script>chart({points: '1 5 1.5 9 2 6'})</script>";
        assert_eq!(parse_doc(doc), Some(vec![vec![(1.0, 5.0), (1.5, 9.0), (2.0, 6.0)]]));
    }

    #[test]
    fn contract_fields_resolve() {
        assert_eq!(field_for("JOBOUT", 2), Some(Field::JobOut2));
        assert_eq!(field_for("INV", 0), Some(Field::Inv));
        assert_eq!(field_for("INV", 1), None);
    }
}
