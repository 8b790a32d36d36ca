//! Tabular data model: cells, column labels, row indexes, frames and series.
//!
//! A raw response is a [`Frame`] with a positional index. The normalization
//! pipeline promotes a date column to the index, reshapes the columns and
//! finally converts the index to calendar [`Period`]s. The result is a
//! [`Normalized`] value: a single [`Series`] when one column remains, a
//! [`Frame`] otherwise.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::ShapeError;
use crate::period::Period;

// ── Cells ────────────────────────────────────────────────────────────

/// One value of a raw or normalized table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Type a raw text field: integer, then float, then text. Blank is null.
    pub fn infer(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Cell::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Cell::Float(f);
        }
        Cell::Text(trimmed.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell. Text and null have none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Null | Cell::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Apply `f` to numeric cells; null and text pass through.
    pub fn map_numeric(&self, f: impl Fn(f64) -> f64) -> Cell {
        match self.as_f64() {
            Some(v) => Cell::Float(f(v)),
            None => self.clone(),
        }
    }

    /// Label used when the cell becomes a column name.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Ordering for category labels: numbers numerically, then text, then null.
    pub fn category_cmp(&self, other: &Cell) -> Ordering {
        fn rank(c: &Cell) -> u8 {
            match c {
                Cell::Int(_) | Cell::Float(_) => 0,
                Cell::Text(_) => 1,
                Cell::Null => 2,
            }
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => match (self, other) {
                (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
                _ => rank(self).cmp(&rank(other)),
            },
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Null, Cell::Float)
    }
}

// ── Column labels ────────────────────────────────────────────────────

/// Column label: a single name, or an (outer, inner) pair for two-level columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKey {
    Flat(String),
    Nested { outer: String, inner: String },
}

impl ColumnKey {
    pub fn flat(name: impl Into<String>) -> Self {
        ColumnKey::Flat(name.into())
    }

    pub fn nested(outer: impl Into<String>, inner: impl Into<String>) -> Self {
        ColumnKey::Nested {
            outer: outer.into(),
            inner: inner.into(),
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, ColumnKey::Nested { .. })
    }

    /// The name of a flat column.
    pub fn as_flat(&self) -> Option<&str> {
        match self {
            ColumnKey::Flat(name) => Some(name),
            ColumnKey::Nested { .. } => None,
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Flat(name) => f.write_str(name),
            ColumnKey::Nested { outer, inner } => write!(f, "{outer}.{inner}"),
        }
    }
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        ColumnKey::Flat(name.to_string())
    }
}

impl From<String> for ColumnKey {
    fn from(name: String) -> Self {
        ColumnKey::Flat(name)
    }
}

// ── Row index ────────────────────────────────────────────────────────

/// Row keys of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowIndex {
    /// Rows addressed by position only, as delivered by the service.
    Positional(usize),
    /// Rows keyed by calendar dates (after date promotion).
    Dates(Vec<NaiveDate>),
    /// Rows keyed by calendar periods (after gap filling).
    Periods(Vec<Period>),
}

impl RowIndex {
    pub fn len(&self) -> usize {
        match self {
            RowIndex::Positional(n) => *n,
            RowIndex::Dates(d) => d.len(),
            RowIndex::Periods(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether rows are keyed by time (dates or periods).
    pub fn is_dated(&self) -> bool {
        !matches!(self, RowIndex::Positional(_))
    }

    pub fn periods(&self) -> Option<&[Period]> {
        match self {
            RowIndex::Periods(p) => Some(p),
            _ => None,
        }
    }

    /// Display label of row `i`.
    pub fn label(&self, i: usize) -> String {
        match self {
            RowIndex::Positional(_) => i.to_string(),
            RowIndex::Dates(d) => d[i].format("%Y-%m-%d").to_string(),
            RowIndex::Periods(p) => p[i].to_string(),
        }
    }

    /// Start date of row `i`, if the index is dated.
    pub fn date(&self, i: usize) -> Option<NaiveDate> {
        match self {
            RowIndex::Positional(_) => None,
            RowIndex::Dates(d) => d.get(i).copied(),
            RowIndex::Periods(p) => p.get(i).map(|p| p.start()),
        }
    }

    /// The index restricted to `rows`, in that order.
    pub fn select(&self, rows: &[usize]) -> RowIndex {
        match self {
            RowIndex::Positional(_) => RowIndex::Positional(rows.len()),
            RowIndex::Dates(d) => RowIndex::Dates(rows.iter().map(|&r| d[r]).collect()),
            RowIndex::Periods(p) => RowIndex::Periods(rows.iter().map(|&r| p[r]).collect()),
        }
    }
}

// ── Frame ────────────────────────────────────────────────────────────

/// An ordered set of labelled columns sharing one row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    index: RowIndex,
    index_name: Option<String>,
    columns: Vec<(ColumnKey, Vec<Cell>)>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// An empty table with no rows and no columns.
    pub fn new() -> Self {
        Self {
            index: RowIndex::Positional(0),
            index_name: None,
            columns: Vec::new(),
        }
    }

    /// A raw table: flat named columns with a positional index.
    pub fn from_columns<S: Into<String>>(
        columns: Vec<(S, Vec<Cell>)>,
    ) -> Result<Self, ShapeError> {
        let height = columns.first().map_or(0, |(_, cells)| cells.len());
        let columns = columns
            .into_iter()
            .map(|(name, cells)| (ColumnKey::Flat(name.into()), cells))
            .collect();
        Self::with_index(RowIndex::Positional(height), columns)
    }

    /// A table with an explicit index. Every column must match its length.
    pub fn with_index(
        index: RowIndex,
        columns: Vec<(ColumnKey, Vec<Cell>)>,
    ) -> Result<Self, ShapeError> {
        let expected = index.len();
        for (key, cells) in &columns {
            if cells.len() != expected {
                return Err(ShapeError::LengthMismatch {
                    column: key.to_string(),
                    expected,
                    actual: cells.len(),
                });
            }
        }
        Ok(Self {
            index,
            index_name: None,
            columns,
        })
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// A table with zero rows, whatever its columns.
    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn set_index_name(&mut self, name: Option<String>) {
        self.index_name = name;
    }

    /// Replace the row index, keeping the columns.
    pub fn set_index(&mut self, index: RowIndex) -> Result<(), ShapeError> {
        if index.len() != self.height() {
            return Err(ShapeError::LengthMismatch {
                column: "<index>".into(),
                expected: self.height(),
                actual: index.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    pub fn columns(&self) -> &[(ColumnKey, Vec<Cell>)] {
        &self.columns
    }

    pub fn keys(&self) -> impl Iterator<Item = &ColumnKey> {
        self.columns.iter().map(|(key, _)| key)
    }

    /// Flat column names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.keys().filter_map(ColumnKey::as_flat).collect()
    }

    /// Whether any column carries a two-level label.
    pub fn has_nested_columns(&self) -> bool {
        self.keys().any(ColumnKey::is_nested)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|(key, _)| key.as_flat() == Some(name))
    }

    /// Cells of the flat column `name`.
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.position(name).map(|i| self.columns[i].1.as_slice())
    }

    /// Cells of the column labelled `key`.
    pub fn get(&self, key: &ColumnKey) -> Option<&[Cell]> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, cells)| cells.as_slice())
    }

    /// Remove the flat column `name` and return its cells.
    pub fn drop_column(&mut self, name: &str) -> Option<Vec<Cell>> {
        self.position(name).map(|i| self.columns.remove(i).1)
    }

    /// Append a column. Its length must equal the table height.
    pub fn push_column(&mut self, key: ColumnKey, cells: Vec<Cell>) -> Result<(), ShapeError> {
        if cells.len() != self.height() {
            return Err(ShapeError::LengthMismatch {
                column: key.to_string(),
                expected: self.height(),
                actual: cells.len(),
            });
        }
        self.columns.push((key, cells));
        Ok(())
    }

    /// Relabel every column through `f`.
    pub fn map_keys(&mut self, mut f: impl FnMut(&ColumnKey) -> ColumnKey) {
        for (key, _) in &mut self.columns {
            *key = f(key);
        }
    }

    /// Keep only the columns labelled in `order`, in that order. Several
    /// columns sharing a label keep their relative order.
    pub fn select_keys(&mut self, order: &[ColumnKey]) {
        let mut remaining = std::mem::take(&mut self.columns);
        for wanted in order {
            let mut i = 0;
            while i < remaining.len() {
                if &remaining[i].0 == wanted {
                    self.columns.push(remaining.remove(i));
                } else {
                    i += 1;
                }
            }
        }
    }

    /// Rows of this table picked by position (repeats allowed), with a new index.
    pub fn take_rows(&self, index: RowIndex, rows: &[usize]) -> Result<Frame, ShapeError> {
        let columns = self
            .columns
            .iter()
            .map(|(key, cells)| {
                (
                    key.clone(),
                    rows.iter().map(|&r| cells[r].clone()).collect(),
                )
            })
            .collect();
        let mut frame = Frame::with_index(index, columns)?;
        frame.index_name = self.index_name.clone();
        Ok(frame)
    }

    /// Append the rows of `other`; columns are the union in first-seen order
    /// and cells missing on either side are null. Both indexes must be positional.
    pub fn vstack(mut self, other: Frame) -> Result<Frame, ShapeError> {
        if self.index.is_dated() || other.index.is_dated() {
            return Err(ShapeError::NotPositional);
        }
        let top = self.height();
        let bottom = other.height();
        for (_, cells) in &mut self.columns {
            cells.resize(top + bottom, Cell::Null);
        }
        for (key, cells) in other.columns {
            match self.columns.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => {
                    existing.truncate(top);
                    existing.extend(cells);
                }
                None => {
                    let mut padded = vec![Cell::Null; top];
                    padded.extend(cells);
                    self.columns.push((key, padded));
                }
            }
        }
        self.index = RowIndex::Positional(top + bottom);
        Ok(self)
    }

    /// Apply `f` to every numeric cell.
    pub fn map_numeric(mut self, f: impl Fn(f64) -> f64) -> Frame {
        for (_, cells) in &mut self.columns {
            for cell in cells.iter_mut() {
                *cell = cell.map_numeric(&f);
            }
        }
        self
    }

    /// Decompose into index, index name and columns.
    pub fn into_parts(self) -> (RowIndex, Option<String>, Vec<(ColumnKey, Vec<Cell>)>) {
        (self.index, self.index_name, self.columns)
    }

    /// Take one column out as a series sharing this table's index.
    pub fn into_series(mut self, key: &ColumnKey) -> Option<Series> {
        let i = self.columns.iter().position(|(k, _)| k == key)?;
        let (key, values) = self.columns.swap_remove(i);
        Some(Series {
            name: Some(key),
            index: self.index,
            index_name: self.index_name,
            values,
        })
    }

    /// Collapse to a series when exactly one column remains, and always when
    /// the table has no rows.
    pub fn squeeze(mut self) -> Normalized {
        if self.is_empty() {
            let name = if self.columns.len() == 1 {
                self.columns.pop().map(|(key, _)| key)
            } else {
                None
            };
            let mut series = Series::empty(name);
            series.index_name = self.index_name;
            return Normalized::Series(series);
        }
        if self.columns.len() == 1 {
            if let Some((key, values)) = self.columns.pop() {
                return Normalized::Series(Series {
                    name: Some(key),
                    index: self.index,
                    index_name: self.index_name,
                    values,
                });
            }
        }
        Normalized::Table(self)
    }
}

// ── Series ───────────────────────────────────────────────────────────

/// A single labelled column with its own index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    name: Option<ColumnKey>,
    index: RowIndex,
    index_name: Option<String>,
    values: Vec<Cell>,
}

impl Series {
    pub fn new(
        name: Option<ColumnKey>,
        index: RowIndex,
        values: Vec<Cell>,
    ) -> Result<Self, ShapeError> {
        if index.len() != values.len() {
            return Err(ShapeError::LengthMismatch {
                column: name.map_or_else(|| "<series>".to_string(), |k| k.to_string()),
                expected: index.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            name,
            index,
            index_name: None,
            values,
        })
    }

    /// A daily-or-monthly series built from (period, value) pairs.
    pub fn from_periods(
        name: impl Into<ColumnKey>,
        points: impl IntoIterator<Item = (Period, Cell)>,
    ) -> Self {
        let (periods, values): (Vec<Period>, Vec<Cell>) = points.into_iter().unzip();
        Self {
            name: Some(name.into()),
            index: RowIndex::Periods(periods),
            index_name: None,
            values,
        }
    }

    /// A series with no rows.
    pub fn empty(name: Option<ColumnKey>) -> Self {
        Self {
            name,
            index: RowIndex::Positional(0),
            index_name: None,
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&ColumnKey> {
        self.name.as_ref()
    }

    pub fn rename(mut self, name: impl Into<ColumnKey>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    /// Value at `period`, if that period is in the index.
    pub fn get(&self, period: Period) -> Option<&Cell> {
        let periods = self.index.periods()?;
        let i = periods.binary_search(&period).ok()?;
        self.values.get(i)
    }

    /// Numeric values; text and null become `None`.
    pub fn to_f64(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Cell::as_f64).collect()
    }

    /// Apply `f` to every numeric value.
    pub fn map_numeric(mut self, f: impl Fn(f64) -> f64) -> Series {
        for cell in self.values.iter_mut() {
            *cell = cell.map_numeric(&f);
        }
        self
    }

    /// Promote to a single-column table. An unnamed series gets the column `0`.
    pub fn into_frame(self) -> Frame {
        let key = self.name.unwrap_or_else(|| ColumnKey::flat("0"));
        Frame {
            index: self.index,
            index_name: self.index_name,
            columns: vec![(key, self.values)],
        }
    }

    pub(crate) fn from_frame_column(frame: Frame, name: Option<ColumnKey>) -> Series {
        let (index, index_name, mut columns) = frame.into_parts();
        let values = columns.pop().map(|(_, cells)| cells).unwrap_or_default();
        Series {
            name,
            index,
            index_name,
            values,
        }
    }
}

impl From<Series> for Frame {
    fn from(series: Series) -> Self {
        series.into_frame()
    }
}

// ── Normalized result ────────────────────────────────────────────────

/// Output of the pipeline: one series, or a table of several columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Normalized {
    Series(Series),
    Table(Frame),
}

impl Normalized {
    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn height(&self) -> usize {
        match self {
            Normalized::Series(s) => s.len(),
            Normalized::Table(t) => t.height(),
        }
    }

    pub fn index(&self) -> &RowIndex {
        match self {
            Normalized::Series(s) => s.index(),
            Normalized::Table(t) => t.index(),
        }
    }

    pub fn as_series(&self) -> Option<&Series> {
        match self {
            Normalized::Series(s) => Some(s),
            Normalized::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Frame> {
        match self {
            Normalized::Table(t) => Some(t),
            Normalized::Series(_) => None,
        }
    }

    pub fn into_series(self) -> Option<Series> {
        match self {
            Normalized::Series(s) => Some(s),
            Normalized::Table(_) => None,
        }
    }

    pub fn into_table(self) -> Option<Frame> {
        match self {
            Normalized::Table(t) => Some(t),
            Normalized::Series(_) => None,
        }
    }

    /// Column labels: the series name, or the table's keys.
    pub fn keys(&self) -> Vec<ColumnKey> {
        match self {
            Normalized::Series(s) => s.name().cloned().into_iter().collect(),
            Normalized::Table(t) => t.keys().cloned().collect(),
        }
    }

    /// Extract the column `key` as a series.
    pub fn column(self, key: &ColumnKey) -> Option<Series> {
        match self {
            Normalized::Series(s) if s.name() == Some(key) => Some(s),
            Normalized::Series(_) => None,
            Normalized::Table(t) => t.into_series(key),
        }
    }

    /// Apply `f` to every numeric value.
    pub fn map_numeric(self, f: impl Fn(f64) -> f64) -> Normalized {
        match self {
            Normalized::Series(s) => Normalized::Series(s.map_numeric(f)),
            Normalized::Table(t) => Normalized::Table(t.map_numeric(f)),
        }
    }
}

impl From<Normalized> for Frame {
    fn from(data: Normalized) -> Self {
        match data {
            Normalized::Series(s) => s.into_frame(),
            Normalized::Table(t) => t,
        }
    }
}
