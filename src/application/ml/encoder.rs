//! Turns raw apartment columns into numeric model inputs.
//!
//! Two rules apply, identically for training frames and single requests:
//! yes/no amenities become drop-first one-hot indicators, and the free-text
//! garden description becomes square meters.

use crate::application::ml::frame::{Column, Frame};
use crate::domain::apartment::{CATEGORICAL_FIELDS, GARDEN_FIELD, PredictionRequest};
use crate::domain::errors::{GardenParseError, PipelineError};
use crate::domain::ml::{EncodingSchema, Feature, FeatureVector, IndicatorColumns};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Garden value meaning "no garden"
pub const GARDEN_ABSENT: &str = "Not present";

/// What to do with a training row whose garden text cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GardenPolicy {
    /// Fail the whole run on the first bad row
    #[default]
    Abort,
    /// Drop bad rows and continue
    DropRow,
}

impl FromStr for GardenPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(GardenPolicy::Abort),
            "drop_row" | "drop" => Ok(GardenPolicy::DropRow),
            _ => anyhow::bail!(
                "Invalid GARDEN_PARSE_POLICY: {}. Must be 'abort' or 'drop_row'",
                s
            ),
        }
    }
}

/// Parse a garden description into square meters.
///
/// `"Not present"` is 0; otherwise the first run of ASCII digits wins, so
/// `"40 m2 garden with shed 12"` is 40. Only `0-9` count as digits, and a run
/// that does not fit in a `u64` is rejected.
pub fn parse_garden(value: &str) -> Result<u64, GardenParseError> {
    if value == GARDEN_ABSENT {
        return Ok(0);
    }

    let err = || GardenParseError {
        value: value.to_string(),
    };

    let start = value.find(|c: char| c.is_ascii_digit()).ok_or_else(err)?;
    let digits: &str = value[start..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or_default();

    digits.parse::<u64>().map_err(|_| err())
}

/// Output of encoding a training frame
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    pub frame: Frame,
    /// Indicator layout for the fields encoded in this pass
    pub schema: EncodingSchema,
    pub dropped_rows: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder {
    garden_policy: GardenPolicy,
}

impl FeatureEncoder {
    pub fn new(garden_policy: GardenPolicy) -> Self {
        Self { garden_policy }
    }

    /// Encode a training frame.
    ///
    /// Columns that are already numeric are left untouched, so running this on
    /// its own output changes nothing.
    pub fn encode(&self, mut frame: Frame) -> Result<EncodedFrame, PipelineError> {
        info!("Encoding categorical columns: {:?}", CATEGORICAL_FIELDS);
        let mut schema = EncodingSchema::default();
        for field in CATEGORICAL_FIELDS {
            if let Some(columns) = Self::encode_categorical(&mut frame, field) {
                debug!(
                    "{}: dropped '{}', indicators {:?}",
                    field,
                    columns.dropped,
                    columns.column_names()
                );
                schema.indicators.push(columns);
            }
        }

        info!("Parsing garden column");
        let dropped_rows = self.encode_garden(&mut frame)?;

        let missing = frame.missing_features();
        if !missing.is_empty() {
            return Err(PipelineError::Encoding {
                reason: format!(
                    "encoded data lacks feature columns {:?}; every amenity needs both 'yes' and 'no' rows",
                    missing
                ),
            });
        }

        Ok(EncodedFrame {
            frame,
            schema,
            dropped_rows,
        })
    }

    fn encode_categorical(frame: &mut Frame, field: &str) -> Option<IndicatorColumns> {
        let values = match frame.column(field) {
            Some(Column::Text(values)) => values.clone(),
            _ => return None,
        };

        let mut observed: Vec<String> = values
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if observed.is_empty() {
            return None;
        }
        let dropped = observed.remove(0);

        frame.remove(field);
        for category in &observed {
            let indicator = values
                .iter()
                .map(|v| if v == category { 1.0 } else { 0.0 })
                .collect();
            frame.insert(format!("{}_{}", field, category), Column::Numeric(indicator));
        }

        Some(IndicatorColumns {
            field: field.to_string(),
            dropped,
            categories: observed,
        })
    }

    fn encode_garden(&self, frame: &mut Frame) -> Result<usize, PipelineError> {
        let values = match frame.column(GARDEN_FIELD) {
            Some(Column::Text(values)) => values.clone(),
            _ => return Ok(0),
        };

        let mut meters = Vec::with_capacity(values.len());
        let mut keep = Vec::with_capacity(values.len());
        for (row, value) in values.iter().enumerate() {
            match parse_garden(value) {
                Ok(m) => {
                    meters.push(m as f64);
                    keep.push(true);
                }
                Err(error) => match self.garden_policy {
                    GardenPolicy::Abort => return Err(PipelineError::Parse { row, error }),
                    GardenPolicy::DropRow => keep.push(false),
                },
            }
        }

        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped > 0 {
            warn!("Dropped {} rows with unparsable garden values", dropped);
            frame.retain_rows(&keep);
        }
        frame.insert(GARDEN_FIELD, Column::Numeric(meters));

        Ok(dropped)
    }

    /// Encode one request against the schema persisted at training time.
    pub fn encode_request(
        request: &PredictionRequest,
        schema: &EncodingSchema,
    ) -> Result<FeatureVector, GardenParseError> {
        let garden = parse_garden(&request.garden)? as f64;

        Ok(FeatureVector::from_fn(|feature| match feature {
            Feature::Area => request.area,
            Feature::ConstractionYear => request.constraction_year,
            Feature::Bedrooms => request.bedrooms,
            Feature::Garden => garden,
            indicator => indicator
                .indicator()
                .filter(|(field, category)| schema.has_column(field, category))
                .and_then(|(field, category)| {
                    request
                        .categorical(field)
                        .map(|v| if v.as_str() == category { 1.0 } else { 0.0 })
                })
                .unwrap_or(0.0),
        }))
    }
}
