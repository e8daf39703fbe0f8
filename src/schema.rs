// src/schema.rs
//
// The fixed column set of the operations table, and the Record/Table types
// every other module passes around.

/// Header of the key column, always first on disk.
pub const DAY_LABEL: &str = "Day";

pub const FIELD_COUNT: usize = 20;

/// Metric columns in canonical (on-disk) order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Inv,
    Cash,
    JobIn,
    JobQ,
    S1Q,
    S2Q,
    S3Q,
    S1Util,
    S2Util,
    S3Util,
    JobT0,
    JobT1,
    JobT2,
    JobRev0,
    JobRev1,
    JobRev2,
    JobOut0,
    JobOut1,
    JobOut2,
    Backlog,
}

use Field::*;

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Inv, Cash, JobIn, JobQ, S1Q, S2Q, S3Q, S1Util, S2Util, S3Util,
        JobT0, JobT1, JobT2, JobRev0, JobRev1, JobRev2, JobOut0, JobOut1, JobOut2,
        Backlog,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical column label.
    pub fn label(self) -> &'static str {
        match self {
            Inv => "INV",
            Cash => "CASH",
            JobIn => "JOBIN",
            JobQ => "JOBQ",
            S1Q => "S1Q",
            S2Q => "S2Q",
            S3Q => "S3Q",
            S1Util => "S1UTIL",
            S2Util => "S2UTIL",
            S3Util => "S3UTIL",
            JobT0 => "JOBT0",
            JobT1 => "JOBT1",
            JobT2 => "JOBT2",
            JobRev0 => "JOBREV0",
            JobRev1 => "JOBREV1",
            JobRev2 => "JOBREV2",
            JobOut0 => "JOBOUT0",
            JobOut1 => "JOBOUT1",
            JobOut2 => "JOBOUT2",
            Backlog => "Backlog",
        }
    }

    /// Other spellings seen in table headers, lowercase, punctuation-free.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Inv => &["inventory"],
            Cash => &["cashbalance", "cashonhand"],
            JobIn => &["jobsin", "jobarrivals", "customerorders"],
            JobQ => &["jobsqueued", "queuedjobs", "jobsinqueue"],
            S1Q => &["station1queue", "station1backlog"],
            S2Q => &["station2queue", "station2backlog"],
            S3Q => &["station3queue", "station3backlog"],
            S1Util => &["station1utilization"],
            S2Util => &["station2utilization"],
            S3Util => &["station3utilization"],
            JobT0 => &["leadtime1", "contract1leadtime"],
            JobT1 => &["leadtime2", "contract2leadtime"],
            JobT2 => &["leadtime3", "contract3leadtime"],
            JobRev0 => &["revenue1", "contract1revenue"],
            JobRev1 => &["revenue2", "contract2revenue"],
            JobRev2 => &["revenue3", "contract3revenue"],
            JobOut0 => &["completed1", "jobsout1", "contract1completed"],
            JobOut1 => &["completed2", "jobsout2", "contract2completed"],
            JobOut2 => &["completed3", "jobsout3", "contract3completed"],
            Backlog => &["aggregatebacklog"],
        }
    }

    /// Resolve a header cell (any case, spacing or punctuation) to a field.
    pub fn from_label(text: &str) -> Option<Field> {
        let key = label_key(text);
        if key.is_empty() {
            return None;
        }
        Field::ALL.into_iter().find(|f| {
            label_key(f.label()) == key || f.aliases().iter().any(|a| *a == key)
        })
    }

    /// Plot series this field is read from, and which of its `points` strings.
    /// Backlog has no series; it is derived.
    pub fn plot_series(self) -> Option<(&'static str, usize)> {
        Some(match self {
            Inv => ("INV", 0),
            Cash => ("CASH", 0),
            JobIn => ("JOBIN", 0),
            JobQ => ("JOBQ", 0),
            S1Q => ("S1Q", 0),
            S2Q => ("S2Q", 0),
            S3Q => ("S3Q", 0),
            S1Util => ("S1UTIL", 0),
            S2Util => ("S2UTIL", 0),
            S3Util => ("S3UTIL", 0),
            JobT0 => ("JOBT", 0),
            JobT1 => ("JOBT", 1),
            JobT2 => ("JOBT", 2),
            JobRev0 => ("JOBREV", 0),
            JobRev1 => ("JOBREV", 1),
            JobRev2 => ("JOBREV", 2),
            JobOut0 => ("JOBOUT", 0),
            JobOut1 => ("JOBOUT", 1),
            JobOut2 => ("JOBOUT", 2),
            Backlog => return None,
        })
    }
}

/// True when a header cell names the day column.
pub fn is_day_label(text: &str) -> bool {
    matches!(label_key(text).as_str(), "day" | "simday" | "simulationday")
}

fn label_key(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Canonical header row: `Day` then every field label.
pub fn headers() -> Vec<String> {
    let mut h = Vec::with_capacity(FIELD_COUNT + 1);
    h.push(s!(DAY_LABEL));
    h.extend(Field::ALL.iter().map(|f| s!(f.label())));
    h
}

/// One simulation day.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub day: u32,
    values: [Option<f64>; FIELD_COUNT],
}

impl Record {
    /// All fields null.
    pub fn new(day: u32) -> Self {
        Self { day, values: [None; FIELD_COUNT] }
    }

    #[inline]
    pub fn get(&self, field: Field) -> Option<f64> {
        self.values[field.index()]
    }

    #[inline]
    pub fn set(&mut self, field: Field, value: Option<f64>) {
        self.values[field.index()] = value;
    }

    pub fn with(mut self, field: Field, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }

    pub fn values(&self) -> &[Option<f64>; FIELD_COUNT] {
        &self.values
    }

    /// Bit-level equality of every field, so `NaN == NaN` and `0.0 != -0.0`.
    pub fn same_values(&self, other: &Record) -> bool {
        self.day == other.day
            && self
                .values
                .iter()
                .zip(other.values.iter())
                .all(|(a, b)| a.map(f64::to_bits) == b.map(f64::to_bits))
    }
}

/// Records strictly ascending by day; the type never holds anything else.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already-ordered records. Returns the first offending day
    /// if the sequence is not strictly ascending or contains day 0.
    pub fn from_records(records: Vec<Record>) -> Result<Self, u32> {
        let mut prev = 0u32;
        for r in &records {
            if r.day <= prev {
                return Err(r.day);
            }
            prev = r.day;
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest recorded day, 0 when empty.
    pub fn max_day(&self) -> u32 {
        self.records.last().map_or(0, |r| r.day)
    }

    pub fn days(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.iter().map(|r| r.day)
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Record> {
        self.records.last_mut()
    }

    /// Caller guarantees `record.day > self.max_day()`.
    pub(crate) fn push(&mut self, record: Record) {
        debug_assert!(record.day > self.max_day());
        self.records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_header_order() {
        let h = headers();
        assert_eq!(h.len(), FIELD_COUNT + 1);
        assert_eq!(h[0], "Day");
        assert_eq!(h[1], "INV");
        assert_eq!(h[10], "S3UTIL");
        assert_eq!(h[17], "JOBOUT0");
        assert_eq!(h[20], "Backlog");
    }

    #[test]
    fn labels_resolve_loosely() {
        assert_eq!(Field::from_label("JOBREV1"), Some(Field::JobRev1));
        assert_eq!(Field::from_label(" s1util "), Some(Field::S1Util));
        assert_eq!(Field::from_label("Station 2 Utilization"), Some(Field::S2Util));
        assert_eq!(Field::from_label("Cash Balance ($)"), Some(Field::Cash));
        assert_eq!(Field::from_label("Day"), None);
        assert_eq!(Field::from_label(""), None);
        assert!(is_day_label("DAY"));
        assert!(is_day_label("Sim. Day"));
    }

    #[test]
    fn every_field_but_backlog_has_a_series() {
        for f in Field::ALL {
            assert_eq!(f.plot_series().is_none(), f == Field::Backlog, "{f:?}");
        }
    }

    #[test]
    fn from_records_rejects_disorder_and_zero() {
        assert!(Table::from_records(vec![Record::new(1), Record::new(2)]).is_ok());
        assert_eq!(Table::from_records(vec![Record::new(2), Record::new(2)]), Err(2));
        assert_eq!(Table::from_records(vec![Record::new(3), Record::new(1)]), Err(1));
        assert_eq!(Table::from_records(vec![Record::new(0)]), Err(0));
    }

    #[test]
    fn same_values_is_bitwise() {
        let a = Record::new(1).with(Field::Cash, 0.0);
        let b = Record::new(1).with(Field::Cash, -0.0);
        assert!(!a.same_values(&b));
        let n = Record::new(1).with(Field::Cash, f64::NAN);
        assert!(n.same_values(&n.clone()));
    }
}
