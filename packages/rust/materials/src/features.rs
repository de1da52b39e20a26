//! Request normalisation and feature extraction for the material model.

use smartbuy_shared::MaterialRequest;

use crate::model::LabelEncoders;

/// Building size assumed when the size label is missing or unrecognised.
pub const DEFAULT_BUILDING_SIZE: f64 = 25_000.0;

/// Feature names, in the column order the model was trained on.
pub const FEATURE_NAMES: [&str; 8] = [
    "SIZE_BUILDINGSIZE",
    "NUMFLOORS",
    "NUMROOMS",
    "NUMBEDS",
    "PROJECT_TYPE",
    "STATE",
    "CORE_MARKET",
    "SIZE_CAT",
];

/// Number of model input features.
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// One row of model input.
pub type FeatureVector = [f64; FEATURE_COUNT];

const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// ProjectProfile
// ---------------------------------------------------------------------------

/// A [`MaterialRequest`] with every field normalised to a usable value.
///
/// Built once per estimate; never fails. Missing or malformed fields fall
/// back to neutral defaults instead of rejecting the request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectProfile {
    pub project_type: String,
    pub state: String,
    pub city: String,
    pub core_market: String,
    pub building_size: f64,
    pub num_floors: f64,
    pub num_rooms: f64,
    pub num_beds: f64,
    pub volume: f64,
}

impl From<&MaterialRequest> for ProjectProfile {
    fn from(req: &MaterialRequest) -> Self {
        Self {
            project_type: or_unknown(&req.project_type),
            state: or_unknown(&req.state),
            city: or_unknown(&req.city),
            core_market: "Enterprise".to_string(),
            building_size: building_size(&req.size_category),
            num_floors: req.num_floors.map(f64::from).unwrap_or(1.0),
            num_rooms: 0.0,
            num_beds: 0.0,
            volume: parse_number(&req.volume).unwrap_or(1.0),
        }
    }
}

impl ProjectProfile {
    /// Stable key identifying this project, used to seed name selection.
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.project_type, self.state, self.city, self.building_size, self.volume
        )
    }

    /// Encode into the model's feature order.
    pub fn features(&self, encoders: &LabelEncoders) -> FeatureVector {
        [
            self.building_size,
            self.num_floors,
            self.num_rooms,
            self.num_beds,
            encoders.encode("PROJECT_TYPE", &self.project_type),
            encoders.encode("STATE", &self.state),
            encoders.encode("CORE_MARKET", &self.core_market),
            f64::from(size_band(self.building_size)),
        ]
    }
}

fn or_unknown(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value.chars().filter(|c| !matches!(c, ',' | '_' | ' ')).collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Map a size label (or a bare number) to a building size.
pub fn building_size(label: &str) -> f64 {
    let lower = label.trim().to_lowercase();
    if lower.starts_with("small") {
        5_000.0
    } else if lower.starts_with("medium") {
        25_000.0
    } else if lower.starts_with("large") {
        100_000.0
    } else {
        parse_number(&lower)
            .filter(|v| *v > 0.0)
            .unwrap_or(DEFAULT_BUILDING_SIZE)
    }
}

/// Ordinal size band over right-closed bins
/// `(0,5k] (5k,20k] (20k,50k] (50k,100k] (100k,inf)`; non-positive sizes
/// get the neutral middle band.
pub fn size_band(building_size: f64) -> u8 {
    match building_size {
        s if s.is_nan() || s <= 0.0 => 2,
        s if s <= 5_000.0 => 0,
        s if s <= 20_000.0 => 1,
        s if s <= 50_000.0 => 2,
        s if s <= 100_000.0 => 3,
        _ => 4,
    }
}
