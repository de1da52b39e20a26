//! Trained model capability and the JSON linear-model artifact.
//!
//! The model strategy only talks to [`MaterialModel`]; a cascade built
//! without one treats the model as unavailable.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use smartbuy_shared::{MaterialCategory, Result, SmartBuyError};

use crate::features::{FEATURE_COUNT, FeatureVector};

// ---------------------------------------------------------------------------
// MaterialModel trait
// ---------------------------------------------------------------------------

/// A trained classifier/regressor pair.
pub trait MaterialModel: Send + Sync {
    /// Label encoders fitted alongside the model.
    fn encoders(&self) -> &LabelEncoders;

    /// Cluster → category mapping for the classifier's classes.
    fn clusters(&self) -> &ClusterMap;

    /// Probability for each cluster, indexed by cluster id.
    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64>;

    /// Predicted `log1p(quantity)`, or `None` without a regressor.
    fn predict_quantity(&self, features: &FeatureVector) -> Option<f64>;

    fn has_regressor(&self) -> bool;
}

/// Summary of the loaded model for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub classifier_loaded: bool,
    pub regressor_loaded: bool,
    pub cluster_count: usize,
}

impl ModelInfo {
    pub fn of(model: Option<&dyn MaterialModel>) -> Self {
        match model {
            Some(m) => Self {
                classifier_loaded: true,
                regressor_loaded: m.has_regressor(),
                cluster_count: m.clusters().len(),
            },
            None => Self {
                classifier_loaded: false,
                regressor_loaded: false,
                cluster_count: 0,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// LabelEncoders
// ---------------------------------------------------------------------------

/// Per-field class lists; a value's code is its index in the sorted list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoders(HashMap<String, Vec<String>>);

impl LabelEncoders {
    pub fn new(fields: HashMap<String, Vec<String>>) -> Self {
        let mut encoders = Self(fields);
        encoders.normalize();
        encoders
    }

    fn normalize(&mut self) {
        for classes in self.0.values_mut() {
            classes.sort();
            classes.dedup();
        }
    }

    /// Encode `value` for `field`. Unknown fields and values get code 0.
    pub fn encode(&self, field: &str, value: &str) -> f64 {
        self.0
            .get(field)
            .and_then(|classes| classes.binary_search_by(|c| c.as_str().cmp(value)).ok())
            .map(|index| index as f64)
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// ClusterMap
// ---------------------------------------------------------------------------

/// Maps classifier cluster ids onto material categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterMap(BTreeMap<usize, MaterialCategory>);

impl ClusterMap {
    pub fn new(map: BTreeMap<usize, MaterialCategory>) -> Self {
        Self(map)
    }

    /// Category for `cluster`; unmapped clusters are `Misc`.
    pub fn category(&self, cluster: usize) -> MaterialCategory {
        self.0.get(&cluster).copied().unwrap_or(MaterialCategory::Misc)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ClusterMap {
    /// The 20-cluster mapping the bundled training data was clustered into.
    fn default() -> Self {
        use MaterialCategory::*;

        let categories = [
            ElectricalEquipment,
            Steel,
            Drywall,
            Steel,
            Cables,
            Steel,
            Steel,
            Hvac,
            Drywall,
            HardwareFasteners,
            HardwareFasteners,
            Drywall,
            Steel,
            Cables,
            Misc,
            Misc,
            Steel,
            Drywall,
            ElectricalEquipment,
            ElectricalEquipment,
        ];
        Self(categories.into_iter().enumerate().collect())
    }
}

// ---------------------------------------------------------------------------
// LinearModel artifact
// ---------------------------------------------------------------------------

/// Multinomial logistic classifier: one intercept and weight row per cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub intercepts: Vec<f64>,
    pub weights: Vec<Vec<f64>>,
}

/// Linear regressor on `log1p(quantity)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub weights: Vec<f64>,
}

/// Model artifact stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    #[serde(default)]
    pub encoders: LabelEncoders,
    #[serde(default)]
    pub clusters: ClusterMap,
    pub classifier: LinearClassifier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regressor: Option<LinearRegressor>,
}

impl LinearModel {
    /// Load and check a model artifact from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SmartBuyError::io(path, e))?;
        let model = Self::from_json(&content)?;

        info!(
            path = %path.display(),
            clusters = model.classifier.intercepts.len(),
            regressor = model.regressor.is_some(),
            "loaded material model"
        );
        Ok(model)
    }

    /// Parse and check a model artifact from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut model: Self = serde_json::from_str(json)
            .map_err(|e| SmartBuyError::model(format!("invalid model artifact: {e}")))?;
        model.encoders.normalize();
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<()> {
        let classes = self.classifier.intercepts.len();
        if classes == 0 {
            return Err(SmartBuyError::model("classifier has no classes"));
        }
        if self.classifier.weights.len() != classes {
            return Err(SmartBuyError::model(format!(
                "classifier has {classes} intercepts but {} weight rows",
                self.classifier.weights.len()
            )));
        }
        if let Some(row) = self
            .classifier
            .weights
            .iter()
            .find(|row| row.len() != FEATURE_COUNT)
        {
            return Err(SmartBuyError::model(format!(
                "classifier weight row has {} entries, expected {FEATURE_COUNT}",
                row.len()
            )));
        }
        if let Some(regressor) = &self.regressor {
            if regressor.weights.len() != FEATURE_COUNT {
                return Err(SmartBuyError::model(format!(
                    "regressor has {} weights, expected {FEATURE_COUNT}",
                    regressor.weights.len()
                )));
            }
        }
        Ok(())
    }
}

fn dot(weights: &[f64], features: &FeatureVector) -> f64 {
    weights.iter().zip(features).map(|(w, x)| w * x).sum()
}

impl MaterialModel for LinearModel {
    fn encoders(&self) -> &LabelEncoders {
        &self.encoders
    }

    fn clusters(&self) -> &ClusterMap {
        &self.clusters
    }

    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        let logits: Vec<f64> = self
            .classifier
            .intercepts
            .iter()
            .zip(&self.classifier.weights)
            .map(|(b, w)| b + dot(w, features))
            .collect();

        // Softmax, shifted by the max logit for numerical stability
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / total).collect()
    }

    fn predict_quantity(&self, features: &FeatureVector) -> Option<f64> {
        self.regressor
            .as_ref()
            .map(|r| r.intercept + dot(&r.weights, features))
    }

    fn has_regressor(&self) -> bool {
        self.regressor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(regressor: bool) -> String {
        let regressor = if regressor {
            r#", "regressor": {"intercept": 2.0, "weights": [0,0,0,0,0,0,0,0]}"#
        } else {
            ""
        };
        format!(
            r#"{{
                "encoders": {{"STATE": ["Maharashtra", "Karnataka"]}},
                "clusters": {{"0": "Steel", "1": "Cement"}},
                "classifier": {{
                    "intercepts": [1.0, 0.0],
                    "weights": [[0,0,0,0,0,0,0,0], [0,0,0,0,0,0,0,0]]
                }}{regressor}
            }}"#
        )
    }

    #[test]
    fn encoders_use_sorted_index() {
        let model = LinearModel::from_json(&artifact(false)).unwrap();
        // Sorted: Karnataka, Maharashtra
        assert_eq!(model.encoders().encode("STATE", "Karnataka"), 0.0);
        assert_eq!(model.encoders().encode("STATE", "Maharashtra"), 1.0);
        assert_eq!(model.encoders().encode("STATE", "Goa"), 0.0);
        assert_eq!(model.encoders().encode("PROJECT_TYPE", "Anything"), 0.0);
    }

    #[test]
    fn softmax_probabilities_sum_to_one() {
        let model = LinearModel::from_json(&artifact(false)).unwrap();
        let proba = model.predict_proba(&[0.0; FEATURE_COUNT]);
        assert_eq!(proba.len(), 2);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(proba[0] > proba[1]);
        assert_eq!(model.clusters().category(1), MaterialCategory::Cement);
        assert_eq!(model.clusters().category(7), MaterialCategory::Misc);
    }

    #[test]
    fn regressor_is_optional() {
        let without = LinearModel::from_json(&artifact(false)).unwrap();
        assert!(without.predict_quantity(&[0.0; FEATURE_COUNT]).is_none());
        assert!(!without.has_regressor());
        assert!(!ModelInfo::of(Some(&without as &dyn MaterialModel)).regressor_loaded);

        let with = LinearModel::from_json(&artifact(true)).unwrap();
        assert_eq!(with.predict_quantity(&[0.0; FEATURE_COUNT]), Some(2.0));

        let info = ModelInfo::of(Some(&with as &dyn MaterialModel));
        assert!(info.regressor_loaded);
        assert_eq!(info.cluster_count, 2);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let json = r#"{"classifier": {"intercepts": [0.0], "weights": [[1.0, 2.0]]}}"#;
        let err = LinearModel::from_json(json).unwrap_err();
        assert!(err.to_string().contains("expected 8"));

        let json = r#"{"classifier": {"intercepts": [], "weights": []}}"#;
        assert!(LinearModel::from_json(json).is_err());
    }

    #[test]
    fn default_cluster_map_matches_training_clusters() {
        let map = ClusterMap::default();
        assert_eq!(map.len(), 20);
        assert_eq!(map.category(0), MaterialCategory::ElectricalEquipment);
        assert_eq!(map.category(7), MaterialCategory::Hvac);
        assert_eq!(map.category(14), MaterialCategory::Misc);
    }

    #[test]
    fn bundled_fixture_loads() {
        let model = LinearModel::load(Path::new("../../../fixtures/models/material_model.json"))
            .expect("load fixture model");
        assert_eq!(model.classifier.intercepts.len(), 20);
        assert!(model.regressor.is_some());
    }

    #[test]
    fn missing_artifact_is_io_error() {
        let err = LinearModel::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, SmartBuyError::Io { .. }));
    }
}
