// src/store.rs
//
// The persisted spreadsheet: one CSV file, `Day` plus the schema columns,
// one row per day ascending. Empty cells are nulls.

use std::{
    fs::{self, File, OpenOptions, TryLockError},
    io,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use crate::config::consts::{LOCK_POLL_MS, LOCK_SUFFIX, STORE_SEP};
use crate::config::options::StoreOptions;
use crate::csv::{parse_rows, write_row};
use crate::file::{ensure_directory, write_atomic};
use crate::schema::{self, is_day_label, Field, Record, Table};

pub struct Store {
    path: PathBuf,
    lock_wait: Duration,
}

/// Held while a run reads, merges and writes the file. Released on drop.
#[derive(Debug)]
pub struct StoreLock {
    _file: File,
    path: PathBuf,
}

impl StoreLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn invalid(path: &Path, msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("{}: {msg}", path.display()))
}

impl Store {
    pub fn new(opts: &StoreOptions) -> Self {
        Self { path: opts.out_path.clone(), lock_wait: opts.lock_wait }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self::new(&StoreOptions { out_path: path.into(), ..StoreOptions::default() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        let mut s = self.path.as_os_str().to_owned();
        s.push(LOCK_SUFFIX);
        PathBuf::from(s)
    }

    /// Exclusive advisory lock on `<file>.lock`, waiting at most `lock_wait`.
    pub fn lock(&self) -> io::Result<StoreLock> {
        let path = self.lock_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_directory(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).truncate(false).write(true).open(&path)?;

        let deadline = Instant::now() + self.lock_wait;
        let mut announced = false;
        loop {
            match file.try_lock() {
                Ok(()) => break,
                Err(TryLockError::WouldBlock) => {
                    if Instant::now() >= deadline {
                        return Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            format!("{} still held by another run after {:?}", path.display(), self.lock_wait),
                        ));
                    }
                    if !announced {
                        logf!("Waiting for another run to release {}", path.display());
                        announced = true;
                    }
                    thread::sleep(Duration::from_millis(LOCK_POLL_MS));
                }
                Err(TryLockError::Error(e)) => return Err(e),
            }
        }
        logd!("Locked {}", path.display());
        Ok(StoreLock { _file: file, path })
    }

    /// Stored table. A missing file or a header-only file is an empty table.
    pub fn load(&self) -> io::Result<Table> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                logf!("No existing table at {}; starting fresh", self.path.display());
                return Ok(Table::new());
            }
            Err(e) => return Err(e),
        };
        let table = parse_table(&text).map_err(|msg| invalid(&self.path, msg))?;
        logd!("Loaded {} days from {}", table.len(), self.path.display());
        Ok(table)
    }

    /// Write the whole table, atomically replacing the file.
    pub fn save(&self, table: &Table) -> io::Result<()> {
        write_atomic(&self.path, render_table(table).as_bytes())?;
        logd!("Wrote {} days to {}", table.len(), self.path.display());
        Ok(())
    }
}

/// Header row maps columns by label, so a file with reordered columns still loads.
pub fn parse_table(text: &str) -> Result<Table, String> {
    let mut rows = parse_rows(text, STORE_SEP).into_iter();
    let Some(header) = rows.next() else { return Ok(Table::new()) };

    let day_col = header
        .iter()
        .position(|h| is_day_label(h))
        .ok_or_else(|| s!("header has no Day column"))?;
    let columns: Vec<Option<Field>> = header.iter().map(|h| Field::from_label(h)).collect();

    let mut records = Vec::new();
    for (i, row) in rows.enumerate() {
        let line = i + 2;
        let day_cell = row.get(day_col).map_or("", |c| c.trim());
        let day: u32 = day_cell
            .parse()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| format!("line {line}: bad day {day_cell:?}"))?;

        let mut rec = Record::new(day);
        for (col, cell) in columns.iter().zip(row.iter()) {
            let (Some(field), cell) = (col, cell.trim()) else { continue };
            if cell.is_empty() { continue; }
            let v: f64 = cell
                .parse()
                .map_err(|_| format!("line {line}: {} = {cell:?} is not a number", field.label()))?;
            rec.set(*field, Some(v));
        }
        records.push(rec);
    }

    Table::from_records(records).map_err(|day| format!("day {day} is out of order or repeated"))
}

pub fn render_table(table: &Table) -> String {
    let mut buf: Vec<u8> = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_row(&mut buf, &schema::headers(), STORE_SEP);
    for r in table.records() {
        let mut row = Vec::with_capacity(schema::FIELD_COUNT + 1);
        row.push(r.day.to_string());
        row.extend(r.values().iter().map(|v| v.map_or_else(String::new, |x| x.to_string())));
        let _ = write_row(&mut buf, &row, STORE_SEP);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reordered_columns_load_by_label() {
        let text = "CASH,Day,INV,Extra\n100.5,1,7,x\n,2,,y\n";
        let t = parse_table(text).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.records()[0].get(Field::Cash), Some(100.5));
        assert_eq!(t.records()[0].get(Field::Inv), Some(7.0));
        assert_eq!(t.records()[1].get(Field::Cash), None);
    }

    #[test]
    fn corrupt_files_are_errors() {
        assert!(parse_table("INV\n1\n").is_err());
        assert!(parse_table("Day,INV\nx,1\n").is_err());
        assert!(parse_table("Day,INV\n1,abc\n").is_err());
        assert!(parse_table("Day,INV\n2,1\n1,1\n").is_err());
    }

    #[test]
    fn render_then_parse_is_bit_identical() {
        let rec = Record::new(1)
            .with(Field::Cash, 0.1 + 0.2)
            .with(Field::S1Util, 1e-7)
            .with(Field::Inv, -0.0);
        let table = Table::from_records(vec![rec, Record::new(2)]).unwrap();
        let back = parse_table(&render_table(&table)).unwrap();
        assert_eq!(back.len(), 2);
        assert!(back.records()[0].same_values(&table.records()[0]));
        assert!(back.records()[1].same_values(&table.records()[1]));
    }

    #[test]
    fn lock_path_appends_suffix() {
        let s = Store::at("out/data.csv");
        assert_eq!(s.lock_path(), PathBuf::from("out/data.csv.lock"));
    }
}
