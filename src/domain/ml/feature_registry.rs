use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 9;

/// Ordered list of feature names.
/// This order MUST match exactly between the training pipeline and the
/// prediction service. Any change here is a breaking change for saved models.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "area",
    "constraction_year",
    "bedrooms",
    "garden",
    "balcony_yes",
    "parking_yes",
    "furnished_yes",
    "garage_yes",
    "storage_yes",
];

/// A model input column. The discriminant is the position in the vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Feature {
    Area = 0,
    ConstractionYear = 1,
    Bedrooms = 2,
    Garden = 3,
    BalconyYes = 4,
    ParkingYes = 5,
    FurnishedYes = 6,
    GarageYes = 7,
    StorageYes = 8,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Area,
        Feature::ConstractionYear,
        Feature::Bedrooms,
        Feature::Garden,
        Feature::BalconyYes,
        Feature::ParkingYes,
        Feature::FurnishedYes,
        Feature::GarageYes,
        Feature::StorageYes,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        FEATURE_NAMES[self as usize]
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// For one-hot indicator features, the source column and the category it flags.
    pub fn indicator(self) -> Option<(&'static str, &'static str)> {
        match self {
            Feature::BalconyYes => Some(("balcony", "yes")),
            Feature::ParkingYes => Some(("parking", "yes")),
            Feature::FurnishedYes => Some(("furnished", "yes")),
            Feature::GarageYes => Some(("garage", "yes")),
            Feature::StorageYes => Some(("storage", "yes")),
            _ => None,
        }
    }
}

// Enum positions and FEATURE_NAMES must agree; checked at compile time.
const _: () = {
    let mut i = 0;
    while i < FEATURE_COUNT {
        assert!(Feature::ALL[i] as usize == i);
        i += 1;
    }
};

/// Model input in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector by asking for each feature in canonical order.
    pub fn from_fn(mut value: impl FnMut(Feature) -> f64) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            values[feature.index()] = value(feature);
        }
        Self(values)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

/// Converts a batch of vectors into row-major rows for the estimator.
pub fn to_rows(vectors: &[FeatureVector]) -> Vec<Vec<f64>> {
    vectors.iter().map(FeatureVector::to_vec).collect()
}

/// Indicator columns produced for one categorical field during training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorColumns {
    pub field: String,
    /// Reference category that received no column
    pub dropped: String,
    /// Categories that received a `<field>_<category>` column, sorted
    pub categories: Vec<String>,
}

impl IndicatorColumns {
    pub fn column_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.field, c))
            .collect()
    }
}

/// One-hot layout observed on the training data.
///
/// Saved inside the model artifact so inference reuses the exact column set
/// instead of deriving one from a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingSchema {
    pub indicators: Vec<IndicatorColumns>,
}

impl EncodingSchema {
    pub fn for_field(&self, field: &str) -> Option<&IndicatorColumns> {
        self.indicators.iter().find(|c| c.field == field)
    }

    pub fn has_column(&self, field: &str, category: &str) -> bool {
        self.for_field(field)
            .is_some_and(|c| c.categories.iter().any(|cat| cat == category))
    }

    /// Canonical indicator features that this schema cannot produce.
    pub fn missing_features(&self) -> Vec<&'static str> {
        Feature::ALL
            .iter()
            .filter_map(|f| f.indicator().map(|(field, cat)| (f.name(), field, cat)))
            .filter(|(_, field, cat)| !self.has_column(field, cat))
            .map(|(name, _, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_length() {
        let vec = FeatureVector::from_fn(|_| 1.0);
        assert_eq!(vec.as_slice().len(), FEATURE_NAMES.len());
    }

    #[test]
    fn test_feature_consistency() {
        let vec = FeatureVector::from_fn(|f| f.index() as f64 * 10.0);
        // area is index 0
        assert_eq!(vec.as_slice()[0], 0.0);
        assert_eq!(vec.get(Feature::Garden), 30.0);
        // storage_yes is last index (8)
        assert_eq!(vec.as_slice()[8], 80.0);
    }

    #[test]
    fn test_names_round_trip_through_enum() {
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            let feature = Feature::from_name(name).unwrap();
            assert_eq!(feature.index(), i);
            assert_eq!(feature.name(), *name);
        }
        assert_eq!(Feature::from_name("rent"), None);
    }

    #[test]
    fn test_indicator_names_match_feature_names() {
        for feature in Feature::ALL {
            if let Some((field, cat)) = feature.indicator() {
                assert_eq!(format!("{}_{}", field, cat), feature.name());
            }
        }
    }

    #[test]
    fn test_missing_features() {
        let schema = EncodingSchema {
            indicators: vec![IndicatorColumns {
                field: "balcony".to_string(),
                dropped: "no".to_string(),
                categories: vec!["yes".to_string()],
            }],
        };

        let missing = schema.missing_features();
        assert!(!missing.contains(&"balcony_yes"));
        assert_eq!(missing.len(), 4);
        assert_eq!(
            schema.for_field("balcony").unwrap().column_names(),
            vec!["balcony_yes".to_string()]
        );
    }
}
