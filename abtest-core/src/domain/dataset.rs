//! Loading and partitioning of experiment datasets.
//!
//! A [`Dataset`] is read once per analysis run, from CSV (header row required)
//! or from a JSON array of row objects. Every row is validated on load; the
//! statistics code downstream only ever sees typed [`Observation`]s.
//!
//! Both formats trim surrounding whitespace from every cell before parsing,
//! so `" variant"` is a variant row whichever loader reads it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::group::{Group, GroupPolicy};
use super::observation::{ContinuousMetric, Observation};
use crate::error::{CoreError, DataError, Result};

pub const COLUMN_USER_ID: &str = "user_id";
pub const COLUMN_GROUP: &str = "group";
pub const COLUMN_CONVERTED: &str = "converted";
pub const COLUMN_TIME_SPENT: &str = "time_spent";
pub const COLUMN_CLICKS: &str = "clicks";
pub const COLUMN_SESSION_COUNT: &str = "session_count";
pub const COLUMN_DATE: &str = "date";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    COLUMN_GROUP,
    COLUMN_CONVERTED,
    COLUMN_TIME_SPENT,
    COLUMN_CLICKS,
    COLUMN_SESSION_COUNT,
    COLUMN_DATE,
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Input encodings understood by [`Dataset::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Json,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Descriptive facts about a loaded dataset, reported alongside the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<String>,
    pub date_range: String,
    pub dropped_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    observations: Vec<Observation>,
    columns: Vec<String>,
    total_rows: usize,
    dropped_rows: usize,
}

impl Dataset {
    /// Build a dataset from already-typed observations.
    pub fn new(observations: Vec<Observation>) -> Self {
        let total_rows = observations.len();
        Self {
            observations,
            columns: std::iter::once(COLUMN_USER_ID)
                .chain(REQUIRED_COLUMNS)
                .map(str::to_string)
                .collect(),
            total_rows,
            dropped_rows: 0,
        }
    }

    /// Load a dataset, choosing the parser from the file extension.
    pub fn load(path: impl AsRef<Path>, policy: GroupPolicy) -> Result<Self> {
        let path = path.as_ref();
        let format = DatasetFormat::from_path(path).ok_or_else(|| {
            CoreError::Validation(format!(
                "unsupported dataset extension for {}: expected .csv or .json",
                path.display()
            ))
        })?;
        let file = File::open(path)?;
        let dataset = match format {
            DatasetFormat::Csv => Self::from_csv_reader(file, policy)?,
            DatasetFormat::Json => Self::from_json_reader(file, policy)?,
        };
        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            dropped = dataset.dropped_rows,
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_csv_reader<R: Read>(reader: R, policy: GroupPolicy) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let columns: Vec<String> = headers.iter().map(str::to_string).collect();
        let index = ColumnIndex::resolve(&columns)?;

        let mut builder = DatasetBuilder::new(columns, policy);
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            builder.push(&index, &record, i + 1)?;
        }
        Ok(builder.finish())
    }

    pub fn from_csv_str(data: &str, policy: GroupPolicy) -> Result<Self> {
        Self::from_csv_reader(data.as_bytes(), policy)
    }

    /// Parse a JSON array of row objects. Columns are taken from the first row.
    pub fn from_json_reader<R: Read>(reader: R, policy: GroupPolicy) -> Result<Self> {
        let rows: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_reader(reader)
                .map_err(|e| DataError::Malformed(format!("invalid JSON dataset: {e}")))?;

        let columns: Vec<String> = match rows.first() {
            Some(first) => first.keys().cloned().collect(),
            None => REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };
        let index = ColumnIndex::resolve(&columns)?;

        let mut builder = DatasetBuilder::new(columns.clone(), policy);
        for (i, row) in rows.iter().enumerate() {
            let mut record = StringRecord::with_capacity(64, columns.len());
            for column in &columns {
                let value = row
                    .get(column)
                    .ok_or_else(|| DataError::MissingColumn(column.clone()))?;
                record.push_field(&json_cell(value));
            }
            builder.push(&index, &record, i + 1)?;
        }
        Ok(builder.finish())
    }

    pub fn from_json_str(data: &str, policy: GroupPolicy) -> Result<Self> {
        Self::from_json_reader(data.as_bytes(), policy)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Rows excluded because their group label was not recognised.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// The non-empty partition for one group.
    pub fn group(&self, group: Group) -> Result<GroupData<'_>> {
        let rows: Vec<&Observation> = self
            .observations
            .iter()
            .filter(|o| o.group == group)
            .collect();
        if rows.is_empty() {
            return Err(DataError::EmptyGroup(group).into());
        }
        Ok(GroupData { group, rows })
    }

    /// Both partitions, failing on the first empty one.
    pub fn partition(&self) -> Result<(GroupData<'_>, GroupData<'_>)> {
        Ok((self.group(Group::Control)?, self.group(Group::Variant)?))
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.observations.iter().map(|o| o.date).min()?;
        let max = self.observations.iter().map(|o| o.date).max()?;
        Some((min, max))
    }

    pub fn info(&self) -> DatasetInfo {
        let date_range = match self.date_range() {
            Some((min, max)) => format!("{} to {}", min.format(DATE_FORMAT), max.format(DATE_FORMAT)),
            None => "n/a".to_string(),
        };
        DatasetInfo {
            total_rows: self.total_rows,
            total_columns: self.columns.len(),
            columns: self.columns.clone(),
            date_range,
            dropped_rows: self.dropped_rows,
        }
    }
}

/// Borrowed view of the observations belonging to one group.
#[derive(Debug, Clone)]
pub struct GroupData<'a> {
    group: Group,
    rows: Vec<&'a Observation>,
}

impl<'a> GroupData<'a> {
    pub fn group(&self) -> Group {
        self.group
    }

    /// Number of users; never zero.
    pub fn n(&self) -> usize {
        self.rows.len()
    }

    pub fn conversions(&self) -> u64 {
        self.rows.iter().filter(|o| o.converted).count() as u64
    }

    pub fn conversion_rate(&self) -> f64 {
        self.conversions() as f64 / self.n() as f64
    }

    pub fn mean_session_count(&self) -> f64 {
        self.rows.iter().map(|o| f64::from(o.session_count)).sum::<f64>() / self.n() as f64
    }

    /// Non-missing values of a metric. Fails if every value is missing.
    pub fn values(&self, metric: ContinuousMetric) -> Result<Vec<f64>> {
        let values: Vec<f64> = self.rows.iter().filter_map(|o| o.metric(metric)).collect();
        if values.is_empty() {
            return Err(DataError::InsufficientData {
                metric: metric.as_str().to_string(),
                group: self.group,
                available: 0,
                required: 1,
            }
            .into());
        }
        Ok(values)
    }
}

struct ColumnIndex {
    user_id: Option<usize>,
    group: usize,
    converted: usize,
    time_spent: usize,
    clicks: usize,
    session_count: usize,
    date: usize,
}

impl ColumnIndex {
    fn resolve(columns: &[String]) -> Result<Self> {
        let positions: HashMap<&str, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let require = |name: &str| {
            positions
                .get(name)
                .copied()
                .ok_or_else(|| CoreError::from(DataError::MissingColumn(name.to_string())))
        };

        Ok(Self {
            user_id: positions.get(COLUMN_USER_ID).copied(),
            group: require(COLUMN_GROUP)?,
            converted: require(COLUMN_CONVERTED)?,
            time_spent: require(COLUMN_TIME_SPENT)?,
            clicks: require(COLUMN_CLICKS)?,
            session_count: require(COLUMN_SESSION_COUNT)?,
            date: require(COLUMN_DATE)?,
        })
    }
}

struct DatasetBuilder {
    observations: Vec<Observation>,
    columns: Vec<String>,
    policy: GroupPolicy,
    total_rows: usize,
    dropped_rows: usize,
}

impl DatasetBuilder {
    fn new(columns: Vec<String>, policy: GroupPolicy) -> Self {
        Self {
            observations: Vec::new(),
            columns,
            policy,
            total_rows: 0,
            dropped_rows: 0,
        }
    }

    fn push(&mut self, index: &ColumnIndex, record: &StringRecord, row: usize) -> Result<()> {
        self.total_rows += 1;
        let cell = |i: usize| record.get(i).unwrap_or("");

        let label = cell(index.group);
        let group = match label.parse::<Group>() {
            Ok(group) => group,
            Err(_) => match self.policy {
                GroupPolicy::Ignore => {
                    tracing::debug!(row, label, "Dropping row with unknown group label");
                    self.dropped_rows += 1;
                    return Ok(());
                }
                GroupPolicy::Reject => {
                    return Err(DataError::UnknownGroup {
                        label: label.to_string(),
                        row,
                    }
                    .into())
                }
            },
        };

        let user_id = match index.user_id.map(cell).filter(|v| !v.is_empty()) {
            Some(raw) => raw.to_string(),
            None => row.to_string(),
        };
        let converted = parse_flag(COLUMN_CONVERTED, row, cell(index.converted))?;
        let time_spent = parse_optional_minutes(row, cell(index.time_spent))?;
        let clicks = {
            let raw = cell(index.clicks);
            if is_missing(raw) {
                None
            } else {
                Some(parse_count(COLUMN_CLICKS, row, raw)?)
            }
        };
        let session_count = {
            let raw = cell(index.session_count);
            let count = parse_count(COLUMN_SESSION_COUNT, row, raw)?;
            if count == 0 {
                return Err(invalid(COLUMN_SESSION_COUNT, row, raw, "must be at least 1"));
            }
            u32::try_from(count)
                .map_err(|_| invalid(COLUMN_SESSION_COUNT, row, raw, "out of range"))?
        };
        let date = {
            let raw = cell(index.date);
            parse_date(raw).ok_or_else(|| {
                invalid(COLUMN_DATE, row, raw, "expected YYYY-MM-DD or an ISO timestamp")
            })?
        };

        self.observations.push(Observation {
            user_id,
            group,
            converted,
            time_spent,
            clicks,
            session_count,
            date,
        });
        Ok(())
    }

    fn finish(self) -> Dataset {
        if self.dropped_rows > 0 {
            tracing::warn!(
                dropped = self.dropped_rows,
                "Rows with a group label other than control/variant were excluded"
            );
        }
        Dataset {
            observations: self.observations,
            columns: self.columns,
            total_rows: self.total_rows,
            dropped_rows: self.dropped_rows,
        }
    }
}

fn invalid(column: &str, row: usize, value: &str, reason: &str) -> CoreError {
    DataError::InvalidValue {
        column: column.to_string(),
        row,
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn is_missing(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null")
}

fn parse_flag(column: &str, row: usize, raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "1.0" | "true" => Ok(true),
        "0" | "0.0" | "false" => Ok(false),
        _ => Err(invalid(column, row, raw, "expected 0 or 1")),
    }
}

fn parse_optional_minutes(row: usize, raw: &str) -> Result<Option<f64>> {
    if is_missing(raw) {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| invalid(COLUMN_TIME_SPENT, row, raw, "not a number"))?;
    if value.is_nan() {
        return Ok(None);
    }
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(COLUMN_TIME_SPENT, row, raw, "must be a non-negative finite number"));
    }
    Ok(Some(value))
}

/// Calendar date of a bare date, a `YYYY-MM-DD HH:MM:SS` timestamp or an RFC 3339 value.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

/// Non-negative integer; integral floats like `"3.0"` are accepted.
fn parse_count(column: &str, row: usize, raw: &str) -> Result<u64> {
    if let Ok(value) = raw.parse::<u64>() {
        return Ok(value);
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| invalid(column, row, raw, "not a number"))?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return Err(invalid(column, row, raw, "expected a non-negative integer"));
    }
    Ok(value as u64)
}

fn json_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
