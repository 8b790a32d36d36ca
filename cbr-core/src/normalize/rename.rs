//! Column relabelling from service codes to semantic names.

use serde::{Deserialize, Serialize};

use crate::frame::{ColumnKey, Frame};

/// Ordered code → name pairs. Order matters: for flat tables it is the
/// output column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMap(Vec<(String, String)>);

impl CodeMap {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Target name for `code`.
    pub fn get(&self, code: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(from, _)| from == code)
            .map(|(_, to)| to.as_str())
    }

    /// Target names, in mapping order.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, to)| to.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn rename<'a>(&'a self, label: &'a str) -> &'a str {
        self.get(label).unwrap_or(label)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CodeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        CodeMap(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Mapping for the inner (or only) column level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelMapping {
    /// Code → name pairs.
    Codes(CodeMap),
    /// One semantic name for a single-column result.
    Name(String),
}

impl LevelMapping {
    pub fn codes<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        LevelMapping::Codes(CodeMap::from_pairs(pairs))
    }

    pub fn name(name: impl Into<String>) -> Self {
        LevelMapping::Name(name.into())
    }
}

/// Relabel columns with `level_0` (outer) and `level_1` (inner or flat).
///
/// Two-level tables remap each level independently and never drop columns.
/// A flat table with a code map is renamed and then restricted to the mapped
/// names, in mapping order; when no mapped name is present every column is
/// kept. A bare name relabels a table that has exactly one column.
pub fn column_rename(
    mut frame: Frame,
    level_0: Option<&CodeMap>,
    level_1: Option<&LevelMapping>,
) -> Frame {
    if frame.has_nested_columns() {
        let inner = match level_1 {
            Some(LevelMapping::Codes(map)) if !map.is_empty() => Some(map),
            _ => None,
        };
        let outer = level_0.filter(|map| !map.is_empty());
        if outer.is_none() && inner.is_none() {
            return frame;
        }
        frame.map_keys(|key| match key {
            ColumnKey::Nested { outer: o, inner: i } => ColumnKey::nested(
                outer.map_or(o.as_str(), |m| m.rename(o)),
                inner.map_or(i.as_str(), |m| m.rename(i)),
            ),
            flat => flat.clone(),
        });
        return frame;
    }

    match level_1 {
        Some(LevelMapping::Codes(map)) if !map.is_empty() => {
            frame.map_keys(|key| match key {
                ColumnKey::Flat(name) => ColumnKey::flat(map.rename(name)),
                nested => nested.clone(),
            });
            let keep: Vec<ColumnKey> = map
                .targets()
                .filter(|target| frame.contains(target))
                .map(ColumnKey::flat)
                .collect();
            if !keep.is_empty() {
                frame.select_keys(&dedup(keep));
            }
            frame
        }
        Some(LevelMapping::Name(name)) if frame.width() == 1 => {
            frame.map_keys(|_| ColumnKey::flat(name.clone()));
            frame
        }
        _ => frame,
    }
}

/// Two codes may share a target; select each label once.
fn dedup(keys: Vec<ColumnKey>) -> Vec<ColumnKey> {
    let mut out: Vec<ColumnKey> = Vec::with_capacity(keys.len());
    for key in keys {
        if !out.contains(&key) {
            out.push(key);
        }
    }
    out
}
