//! Long-to-wide reshaping for endpoints that deliver one row per category.
//!
//! Metals prices arrive as (date, metal code, price) rows and interbank rates
//! as (date, rate type, tenor values...) rows. Both are pivoted so that each
//! category becomes a column. For a repeated (date, category) pair the first
//! observed value wins: the service appends in time order, so later
//! duplicates are restatements.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::error::ShapeError;
use crate::frame::{Cell, ColumnKey, Frame, RowIndex};

pub const METAL_CODE_COLUMN: &str = "CodMet";
pub const METAL_PRICE_COLUMN: &str = "price";
pub const RATE_TYPE_COLUMN: &str = "p1";
pub const TENOR_COLUMNS: [&str; 4] = ["d1", "d7", "d30", "d90"];

/// Known raw layouts of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawShape {
    /// One column per field already; nothing to pivot.
    #[default]
    Flat,
    /// `DrgMet`: per-date, per-metal-code price rows.
    Metals,
    /// `MKR`: per-date, per-rate-type rows of tenor values.
    Interbank,
}

impl RawShape {
    /// Map the service's row element name to its layout.
    pub fn from_hint(hint: &str) -> Self {
        match hint {
            "DrgMet" => RawShape::Metals,
            "MKR" => RawShape::Interbank,
            _ => RawShape::Flat,
        }
    }
}

/// Pivot grouped rows into columns according to `shape`.
pub fn unstack_groups(frame: Frame, shape: RawShape) -> Result<Frame, ShapeError> {
    if frame.is_empty() {
        return Ok(frame);
    }
    match shape {
        RawShape::Flat => Ok(frame),
        RawShape::Metals => unstack_metals(frame),
        RawShape::Interbank => unstack_interbank(frame),
    }
}

/// Metal codes become flat columns holding the price.
fn unstack_metals(frame: Frame) -> Result<Frame, ShapeError> {
    let grouped = Grouped::build(&frame, METAL_CODE_COLUMN, &[METAL_PRICE_COLUMN], true)?;
    let columns = (0..grouped.categories.len())
        .map(|c| (ColumnKey::Flat(grouped.categories[c].label()), grouped.column(c, 0)))
        .collect();
    grouped.into_frame(&frame, columns)
}

/// Rate types become the outer column level, tenors the inner one.
fn unstack_interbank(frame: Frame) -> Result<Frame, ShapeError> {
    let grouped = Grouped::build(&frame, RATE_TYPE_COLUMN, &TENOR_COLUMNS, false)?;
    let mut columns = Vec::with_capacity(grouped.categories.len() * TENOR_COLUMNS.len());
    for c in 0..grouped.categories.len() {
        let outer = grouped.categories[c].label();
        for (v, tenor) in TENOR_COLUMNS.iter().enumerate() {
            columns.push((ColumnKey::nested(outer.clone(), *tenor), grouped.column(c, v)));
        }
    }
    grouped.into_frame(&frame, columns)
}

/// First observed value per (date, category) for each value column.
struct Grouped {
    dates: Vec<NaiveDate>,
    categories: Vec<Cell>,
    /// `slots[v][d * categories.len() + c]`
    slots: Vec<Vec<Cell>>,
}

impl Grouped {
    /// Group `frame` by (index date, `category`). Value columns missing from
    /// the table are all-null unless `require_values` is set.
    fn build(
        frame: &Frame,
        category: &str,
        values: &[&str],
        require_values: bool,
    ) -> Result<Self, ShapeError> {
        let row_dates: Vec<NaiveDate> = (0..frame.height())
            .map(|i| frame.index().date(i))
            .collect::<Option<_>>()
            .ok_or(ShapeError::MissingDateColumn)?;

        let codes = frame.column(category).ok_or_else(|| ShapeError::MissingColumn {
            column: category.to_string(),
        })?;

        let mut value_columns = Vec::with_capacity(values.len());
        for name in values {
            match frame.column(name) {
                Some(cells) => value_columns.push(Some(cells)),
                None if require_values => {
                    return Err(ShapeError::MissingColumn {
                        column: name.to_string(),
                    })
                }
                None => value_columns.push(None),
            }
        }

        let dates: Vec<NaiveDate> = row_dates
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let date_pos: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        // Null keys are dropped, as a group-by would.
        let mut categories: Vec<Cell> = Vec::new();
        for code in codes.iter().filter(|c| !c.is_null()) {
            if !categories.iter().any(|known| known.label() == code.label()) {
                categories.push(code.clone());
            }
        }
        categories.sort_by(|a, b| a.category_cmp(b));
        let cat_pos: HashMap<String, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.label(), i))
            .collect();

        let width = categories.len();
        let mut slots = vec![vec![Cell::Null; dates.len() * width]; values.len()];

        for (row, code) in codes.iter().enumerate() {
            let Some(&c) = cat_pos.get(&code.label()).filter(|_| !code.is_null()) else {
                continue;
            };
            let d = date_pos[&row_dates[row]];
            for (v, cells) in value_columns.iter().enumerate() {
                let Some(cells) = cells else { continue };
                let slot = &mut slots[v][d * width + c];
                if slot.is_null() && !cells[row].is_null() {
                    *slot = cells[row].clone();
                }
            }
        }

        debug!(
            category,
            dates = dates.len(),
            categories = width,
            "unstacked grouped rows"
        );
        Ok(Self {
            dates,
            categories,
            slots,
        })
    }

    /// Cells of category `c` for value column `v`, one per date.
    fn column(&self, c: usize, v: usize) -> Vec<Cell> {
        let width = self.categories.len();
        (0..self.dates.len())
            .map(|d| self.slots[v][d * width + c].clone())
            .collect()
    }

    fn into_frame(
        self,
        source: &Frame,
        columns: Vec<(ColumnKey, Vec<Cell>)>,
    ) -> Result<Frame, ShapeError> {
        let mut out = Frame::with_index(RowIndex::Dates(self.dates), columns)?;
        out.set_index_name(source.index_name().map(str::to_string));
        Ok(out)
    }
}
