//! Apartment records as they arrive from the data source and from API callers.

use crate::domain::errors::{FieldIssue, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Names of the yes/no amenity columns, in canonical feature order.
pub const CATEGORICAL_FIELDS: [&str; 5] = ["balcony", "parking", "furnished", "garage", "storage"];

/// Column carrying the free-text garden description.
pub const GARDEN_FIELD: &str = "garden";

/// Target column.
pub const TARGET_FIELD: &str = "rent";

/// One historical apartment row. Unknown source columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub area: f64,
    pub constraction_year: f64,
    pub bedrooms: f64,
    pub garden: String,
    pub balcony: String,
    pub parking: String,
    pub furnished: String,
    pub garage: String,
    pub storage: String,
    pub rent: f64,
}

impl RawRecord {
    /// Value of a categorical column by name
    pub fn categorical(&self, field: &str) -> Option<&str> {
        match field {
            "balcony" => Some(&self.balcony),
            "parking" => Some(&self.parking),
            "furnished" => Some(&self.furnished),
            "garage" => Some(&self.garage),
            "storage" => Some(&self.storage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            YesNo::Yes => "yes",
            YesNo::No => "no",
        }
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for YesNo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(YesNo::Yes),
            "no" => Ok(YesNo::No),
            other => Err(format!("expected \"yes\" or \"no\", got {:?}", other)),
        }
    }
}

/// Validated apartment attributes for a single prediction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub area: f64,
    pub constraction_year: f64,
    pub bedrooms: f64,
    pub garden: String,
    pub balcony: YesNo,
    pub parking: YesNo,
    pub furnished: YesNo,
    pub garage: YesNo,
    pub storage: YesNo,
}

impl PredictionRequest {
    /// Validate an untyped field map (query string or JSON object).
    ///
    /// Numeric fields accept JSON numbers or numeric strings, since query
    /// parameters always arrive as text. Every problem is collected, not just
    /// the first. Fields outside the schema are ignored.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut issues = Vec::new();

        let area = number_field(fields, "area", &mut issues);
        let constraction_year = number_field(fields, "constraction_year", &mut issues);
        let bedrooms = number_field(fields, "bedrooms", &mut issues);
        let garden = text_field(fields, GARDEN_FIELD, &mut issues);
        let balcony = yes_no_field(fields, "balcony", &mut issues);
        let parking = yes_no_field(fields, "parking", &mut issues);
        let furnished = yes_no_field(fields, "furnished", &mut issues);
        let garage = yes_no_field(fields, "garage", &mut issues);
        let storage = yes_no_field(fields, "storage", &mut issues);

        match (
            area,
            constraction_year,
            bedrooms,
            garden,
            balcony,
            parking,
            furnished,
            garage,
            storage,
        ) {
            (
                Some(area),
                Some(constraction_year),
                Some(bedrooms),
                Some(garden),
                Some(balcony),
                Some(parking),
                Some(furnished),
                Some(garage),
                Some(storage),
            ) if issues.is_empty() => Ok(Self {
                area,
                constraction_year,
                bedrooms,
                garden,
                balcony,
                parking,
                furnished,
                garage,
                storage,
            }),
            _ => Err(ValidationError { issues }),
        }
    }

    /// Amenity value by column name
    pub fn categorical(&self, field: &str) -> Option<YesNo> {
        match field {
            "balcony" => Some(self.balcony),
            "parking" => Some(self.parking),
            "furnished" => Some(self.furnished),
            "garage" => Some(self.garage),
            "storage" => Some(self.storage),
            _ => None,
        }
    }
}

/// API response payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: f64,
}

fn issue(issues: &mut Vec<FieldIssue>, field: &str, message: impl Into<String>) {
    issues.push(FieldIssue {
        field: field.to_string(),
        message: message.into(),
    });
}

fn number_field(
    fields: &Map<String, Value>,
    name: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<f64> {
    let parsed = match fields.get(name) {
        None | Some(Value::Null) => {
            issue(issues, name, "field is required");
            return None;
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Some(v),
        _ => {
            issue(issues, name, "expected a finite number");
            None
        }
    }
}

fn text_field(
    fields: &Map<String, Value>,
    name: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match fields.get(name) {
        None | Some(Value::Null) => {
            issue(issues, name, "field is required");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            issue(issues, name, "expected a string");
            None
        }
    }
}

fn yes_no_field(
    fields: &Map<String, Value>,
    name: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<YesNo> {
    match fields.get(name) {
        None | Some(Value::Null) => {
            issue(issues, name, "field is required");
            None
        }
        Some(Value::String(s)) => match YesNo::from_str(s) {
            Ok(v) => Some(v),
            Err(e) => {
                issue(issues, name, e);
                None
            }
        },
        Some(_) => {
            issue(issues, name, "expected \"yes\" or \"no\"");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test fixture must be an object"),
        }
    }

    fn valid() -> Value {
        json!({
            "area": 50,
            "constraction_year": 2000,
            "bedrooms": 2,
            "garden": "Not present",
            "balcony": "no",
            "parking": "no",
            "furnished": "no",
            "garage": "no",
            "storage": "no"
        })
    }

    #[test]
    fn test_valid_request() {
        let request = PredictionRequest::from_fields(&fields(valid())).unwrap();
        assert_eq!(request.area, 50.0);
        assert_eq!(request.balcony, YesNo::No);
        assert_eq!(request.garden, "Not present");
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let mut map = fields(valid());
        map.insert("area".to_string(), json!("72.5"));
        map.insert("bedrooms".to_string(), json!(" 3 "));

        let request = PredictionRequest::from_fields(&map).unwrap();
        assert_eq!(request.area, 72.5);
        assert_eq!(request.bedrooms, 3.0);
    }

    #[test]
    fn test_missing_bedrooms_rejected() {
        let mut map = fields(valid());
        map.remove("bedrooms");

        let err = PredictionRequest::from_fields(&map).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].field, "bedrooms");
    }

    #[test]
    fn test_all_issues_collected() {
        let mut map = fields(valid());
        map.insert("balcony".to_string(), json!("maybe"));
        map.insert("area".to_string(), json!("big"));
        map.insert("garden".to_string(), json!(12));

        let err = PredictionRequest::from_fields(&map).unwrap_err();
        let names: Vec<&str> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(names, vec!["area", "garden", "balcony"]);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let mut map = fields(valid());
        map.insert("neighborhood".to_string(), json!("center"));
        assert!(PredictionRequest::from_fields(&map).is_ok());
    }

    #[test]
    fn test_yes_no_is_case_sensitive() {
        assert_eq!(YesNo::from_str("yes"), Ok(YesNo::Yes));
        assert!(YesNo::from_str("Yes").is_err());
    }
}
