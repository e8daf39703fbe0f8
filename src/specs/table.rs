// src/specs/table.rs
//! Spec for a page carrying the operations data as an HTML table.
//!
//! The table is found by its header row, not its position: the first
//! `<table>` with a row naming a `Day` column and at least one schema
//! column. Columns map to fields through that header row, so the site may
//! reorder or add columns freely.

use crate::core::html::{self, Markup};
use crate::core::sanitize::{parse_day, parse_number};
use crate::error::{Error, Result};
use crate::schema::{is_day_label, Field, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Column {
    Day,
    Metric(Field),
    Ignored,
}

/// Header row resolved to columns, plus where the data rows start.
struct Located<'a> {
    table: &'a str,
    columns: Vec<Column>,
    /// Byte offset in `table` just past the header row
    body_from: usize,
}

pub fn extract(doc: &str) -> Result<Vec<Record>> {
    let located = locate(doc).ok_or_else(|| {
        Error::Parse(s!("no table with a Day column and known metric headers"))
    })?;

    let mapped = located.columns.iter().filter(|c| matches!(c, Column::Metric(_))).count();
    logd!("Operations table found: {} columns, {mapped} mapped", located.columns.len());

    let table = Markup::new(located.table);
    let day_col = located.columns.iter().position(|c| *c == Column::Day).unwrap_or(0);
    let mut records = Vec::new();
    let mut pos = located.body_from;
    let mut row_no = 0usize;

    while let Some((s, e)) = table.next_block("tr", pos) {
        pos = e;
        row_no += 1;
        let cells = row_cells(&located.table[s..e]);
        if cells.is_empty() { continue; }

        let day_cell = cells.get(day_col).map(String::as_str).unwrap_or("");
        if is_day_label(day_cell) { continue; } // repeated header
        let Some(day) = parse_day(day_cell) else {
            logw!("Table row {row_no}: day {day_cell:?} is not a positive whole number; row dropped");
            continue;
        };

        let mut rec = Record::new(day);
        for (col, cell) in located.columns.iter().zip(cells.iter()) {
            if let Column::Metric(f) = col {
                let v = parse_number(cell);
                if v.is_none() && !cell.is_empty() {
                    logd!("Day {day} {}: {cell:?} is not numeric", f.label());
                }
                rec.set(*f, v);
            }
        }
        records.push(rec);
    }

    Ok(super::order_last_wins(records))
}

fn locate(doc: &str) -> Option<Located<'_>> {
    let page = Markup::new(doc);
    for table in page.blocks("table") {
        let t = Markup::new(table);

        // Header inside a <tr>
        let mut pos = 0usize;
        while let Some((s, e)) = t.next_block("tr", pos) {
            pos = e;
            let columns = resolve_header(&row_cells(&table[s..e]));
            if let Some(columns) = columns {
                return Some(Located { table, columns, body_from: e });
            }
        }

        // Bare <th> run without a <tr> around it
        let ths: Vec<String> = t.blocks("th").into_iter().map(html::cell_text).collect();
        if let Some(columns) = resolve_header(&ths) {
            // Data rows begin after the last header cell
            let mut body_from = 0usize;
            while let Some((_, e)) = t.next_block("th", body_from) { body_from = e; }
            return Some(Located { table, columns, body_from });
        }
    }
    None
}

/// A header row qualifies with a Day column and at least one metric column.
fn resolve_header(cells: &[String]) -> Option<Vec<Column>> {
    let mut seen_day = false;
    let mut seen: Vec<Field> = Vec::new();
    let columns: Vec<Column> = cells
        .iter()
        .map(|c| {
            if !seen_day && is_day_label(c) {
                seen_day = true;
                return Column::Day;
            }
            match Field::from_label(c) {
                Some(f) if !seen.contains(&f) => {
                    seen.push(f);
                    Column::Metric(f)
                }
                _ => Column::Ignored,
            }
        })
        .collect();

    (seen_day && !seen.is_empty()).then_some(columns)
}

/// Cell texts of one `<tr>`, `<td>` and `<th>` alike, in document order.
fn row_cells(tr: &str) -> Vec<String> {
    let row = Markup::new(tr);
    let mut cells = Vec::new();
    let mut pos = 0usize;
    loop {
        let td = row.next_block("td", pos);
        let th = row.next_block("th", pos);
        let next = match (td, th) {
            (Some(a), Some(b)) => if a.0 < b.0 { a } else { b },
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => break,
        };
        cells.push(html::cell_text(&tr[next.0..next.1]));
        pos = next.1;
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_cells_mixes_th_and_td_in_order() {
        let cells = row_cells("<tr><th>4</th><td>$1,000</td><td> 7 </td></tr>");
        assert_eq!(cells, vec![s!("4"), s!("$1,000"), s!("7")]);
    }

    #[test]
    fn header_needs_day_and_a_metric() {
        assert!(resolve_header(&[s!("Day"), s!("Name")]).is_none());
        assert!(resolve_header(&[s!("INV"), s!("CASH")]).is_none());
        let cols = resolve_header(&[s!("Day"), s!("Notes"), s!("CASH"), s!("cash")]).unwrap();
        assert_eq!(cols, vec![Column::Day, Column::Ignored, Column::Metric(Field::Cash), Column::Ignored]);
    }

    #[test]
    fn bare_th_header_is_recognized() {
        let doc = "<table><th>Day</th><th>INV</th><tr><td>1</td><td>50</td></tr></table>";
        let recs = extract(doc).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].get(Field::Inv), Some(50.0));
    }
}
