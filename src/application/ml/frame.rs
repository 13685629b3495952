//! Column-oriented table used between loading and feature selection.

use crate::domain::apartment::{RawRecord, TARGET_FIELD};
use crate::domain::errors::PipelineError;
use crate::domain::ml::{FEATURE_NAMES, Feature, FeatureVector};

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<String>),
    Numeric(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn retain_rows(&mut self, keep: &[bool]) {
        match self {
            Column::Text(v) => retain_by_mask(v, keep),
            Column::Numeric(v) => retain_by_mask(v, keep),
        }
    }
}

fn retain_by_mask<T>(values: &mut Vec<T>, keep: &[bool]) {
    let mut idx = 0;
    values.retain(|_| {
        let k = keep.get(idx).copied().unwrap_or(true);
        idx += 1;
        k
    });
}

/// Named columns in insertion order, all of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<(String, Column)>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[RawRecord]) -> Self {
        let numeric = |f: fn(&RawRecord) -> f64| Column::Numeric(records.iter().map(f).collect());
        let text = |f: fn(&RawRecord) -> &str| {
            Column::Text(records.iter().map(|r| f(r).to_string()).collect())
        };

        let mut frame = Frame::new();
        frame.insert("area", numeric(|r| r.area));
        frame.insert("constraction_year", numeric(|r| r.constraction_year));
        frame.insert("bedrooms", numeric(|r| r.bedrooms));
        frame.insert("garden", text(|r| r.garden.as_str()));
        frame.insert("balcony", text(|r| r.balcony.as_str()));
        frame.insert("parking", text(|r| r.parking.as_str()));
        frame.insert("furnished", text(|r| r.furnished.as_str()));
        frame.insert("garage", text(|r| r.garage.as_str()));
        frame.insert("storage", text(|r| r.storage.as_str()));
        frame.insert(TARGET_FIELD, numeric(|r| r.rent));
        frame
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Replaces a column in place, or appends it when the name is new.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name, column)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Column> {
        let pos = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(pos).1)
    }

    /// Keeps rows whose mask entry is `true`, across every column.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for (_, column) in &mut self.columns {
            column.retain_rows(keep);
        }
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64], PipelineError> {
        match self.column(name) {
            Some(Column::Numeric(values)) => Ok(values),
            Some(Column::Text(_)) => Err(PipelineError::Encoding {
                reason: format!("column '{}' is not numeric", name),
            }),
            None => Err(PipelineError::Encoding {
                reason: format!("column '{}' is missing", name),
            }),
        }
    }

    /// Canonical feature columns that are absent or not yet numeric.
    pub fn missing_features(&self) -> Vec<&'static str> {
        FEATURE_NAMES
            .iter()
            .copied()
            .filter(|name| !matches!(self.column(name), Some(Column::Numeric(_))))
            .collect()
    }

    /// Selects the model inputs by name, in canonical order.
    pub fn feature_vectors(&self) -> Result<Vec<FeatureVector>, PipelineError> {
        let columns = Feature::ALL
            .iter()
            .map(|f| self.numeric(f.name()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((0..self.n_rows())
            .map(|row| FeatureVector::from_fn(|f| columns[f.index()][row]))
            .collect())
    }

    pub fn target(&self) -> Result<Vec<f64>, PipelineError> {
        self.numeric(TARGET_FIELD).map(<[f64]>::to_vec)
    }
}
