//! The three material strategies, most to least informed.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use smartbuy_core::Strategy;
use smartbuy_shared::{MaterialEstimate, MaterialSource, StrategyError, StrategyResult};

use crate::catalog::{
    cost_of, essential_materials, floor_at_least_one, material_name, ratio_materials,
    size_multiplier,
};
use crate::features::ProjectProfile;
use crate::model::MaterialModel;

/// Base quantity used when the model has no regressor.
const DEFAULT_BASE_QUANTITY: u64 = 10;

/// Extra scale applied on top of size multiplier and probability.
const PROBABILITY_SCALE: f64 = 5.0;

// ---------------------------------------------------------------------------
// Model strategy
// ---------------------------------------------------------------------------

/// Predicts categories and quantities with a trained model.
pub struct ModelStrategy {
    model: Option<Arc<dyn MaterialModel>>,
    min_probability: f64,
    top_k: usize,
}

impl ModelStrategy {
    pub fn new(model: Option<Arc<dyn MaterialModel>>, min_probability: f64, top_k: usize) -> Self {
        Self {
            model,
            min_probability,
            top_k,
        }
    }
}

#[async_trait]
impl Strategy<ProjectProfile, MaterialEstimate, MaterialSource> for ModelStrategy {
    fn name(&self) -> &str {
        "model"
    }

    fn source(&self) -> MaterialSource {
        MaterialSource::Model
    }

    async fn attempt(&self, project: &ProjectProfile) -> StrategyResult<Vec<MaterialEstimate>> {
        let model = self
            .model
            .as_deref()
            .ok_or_else(|| StrategyError::SourceUnavailable("no trained model loaded".into()))?;

        let features = project.features(model.encoders());
        let proba = model.predict_proba(&features);
        if proba.is_empty() {
            return Err(StrategyError::EmptyResult("classifier returned no classes".into()));
        }

        let base_quantity = model
            .predict_quantity(&features)
            .map(|log_qty| floor_at_least_one(log_qty.exp_m1()))
            .unwrap_or(DEFAULT_BASE_QUANTITY);
        let multiplier = size_multiplier(project.building_size);
        let key = project.key();

        let mut ranked: Vec<(usize, f64)> = proba.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(self.top_k);

        debug!(base_quantity, multiplier, candidates = ranked.len(), "model prediction");

        // Lines already named per category
        let mut seen: HashMap<_, usize> = HashMap::new();
        let materials = ranked
            .into_iter()
            .enumerate()
            .filter(|(_, (_, p))| p.is_finite() && *p >= self.min_probability)
            .map(|(rank, (cluster, probability))| {
                let category = model.clusters().category(cluster);
                let occurrence = seen.entry(category).or_insert(0);
                let name = material_name(&key, category, *occurrence);
                *occurrence += 1;
                let cost = cost_of(category);
                let quantity = floor_at_least_one(
                    base_quantity as f64 * multiplier * probability * PROBABILITY_SCALE,
                );
                MaterialEstimate {
                    id: (rank + 1).to_string(),
                    name: name.to_string(),
                    category,
                    quantity,
                    unit: cost.unit.to_string(),
                    cost: cost.base_cost.saturating_mul(quantity),
                }
            })
            .collect();

        Ok(materials)
    }
}

// ---------------------------------------------------------------------------
// Rule strategy
// ---------------------------------------------------------------------------

/// Quantities from fixed per-material ratios against building size.
pub struct RuleStrategy;

#[async_trait]
impl Strategy<ProjectProfile, MaterialEstimate, MaterialSource> for RuleStrategy {
    fn name(&self) -> &str {
        "rule"
    }

    fn source(&self) -> MaterialSource {
        MaterialSource::Rule
    }

    async fn attempt(&self, project: &ProjectProfile) -> StrategyResult<Vec<MaterialEstimate>> {
        Ok(ratio_materials(project.building_size))
    }
}

// ---------------------------------------------------------------------------
// Essential-set strategy
// ---------------------------------------------------------------------------

/// The minimum set every structure needs. Always succeeds.
pub struct EssentialStrategy;

#[async_trait]
impl Strategy<ProjectProfile, MaterialEstimate, MaterialSource> for EssentialStrategy {
    fn name(&self) -> &str {
        "essential"
    }

    fn source(&self) -> MaterialSource {
        MaterialSource::Synthetic
    }

    async fn attempt(&self, project: &ProjectProfile) -> StrategyResult<Vec<MaterialEstimate>> {
        Ok(essential_materials(project.building_size))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::model::{ClusterMap, LabelEncoders};
    use smartbuy_shared::{MaterialCategory, MaterialRequest};

    /// Model with a fixed distribution and optional log-quantity.
    pub(crate) struct StubModel {
        pub proba: Vec<f64>,
        pub log_quantity: Option<f64>,
        pub encoders: LabelEncoders,
        pub clusters: ClusterMap,
    }

    impl StubModel {
        pub(crate) fn new(proba: Vec<f64>, log_quantity: Option<f64>) -> Self {
            Self {
                proba,
                log_quantity,
                encoders: LabelEncoders::default(),
                clusters: ClusterMap::default(),
            }
        }
    }

    impl MaterialModel for StubModel {
        fn encoders(&self) -> &LabelEncoders {
            &self.encoders
        }

        fn clusters(&self) -> &ClusterMap {
            &self.clusters
        }

        fn predict_proba(&self, _features: &FeatureVector) -> Vec<f64> {
            self.proba.clone()
        }

        fn predict_quantity(&self, _features: &FeatureVector) -> Option<f64> {
            self.log_quantity
        }

        fn has_regressor(&self) -> bool {
            self.log_quantity.is_some()
        }
    }

    pub(crate) fn medium_project() -> ProjectProfile {
        ProjectProfile::from(&MaterialRequest {
            project_type: "Commercial Construction".into(),
            size_category: "Medium (₹1Cr–₹10Cr)".into(),
            state: "Maharashtra".into(),
            city: "Mumbai".into(),
            volume: "50000000".into(),
            num_floors: None,
        })
    }

    #[tokio::test]
    async fn model_strategy_without_model_is_unavailable() {
        let strategy = ModelStrategy::new(None, 0.05, 8);
        let err = strategy.attempt(&medium_project()).await.unwrap_err();
        assert!(matches!(err, StrategyError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn model_strategy_drops_unlikely_clusters() {
        // Clusters 1 (Steel) and 7 (HVAC) clear the threshold
        let mut proba = vec![0.01; 20];
        proba[1] = 0.6;
        proba[7] = 0.2;
        let model: Arc<dyn MaterialModel> = Arc::new(StubModel::new(proba, None));
        let strategy = ModelStrategy::new(Some(model), 0.05, 8);

        let materials = strategy.attempt(&medium_project()).await.unwrap();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].category, MaterialCategory::Steel);
        assert_eq!(materials[1].category, MaterialCategory::Hvac);

        // base 10 * size 2.0 * p 0.6 * 5 = 60
        assert_eq!(materials[0].quantity, 60);
        assert_eq!(materials[0].cost, 60 * 125_000);
        assert_eq!(materials[0].unit, "tons");
    }

    #[tokio::test]
    async fn model_strategy_caps_at_top_k() {
        let model: Arc<dyn MaterialModel> = Arc::new(StubModel::new(vec![0.05; 20], Some(3.0)));
        let strategy = ModelStrategy::new(Some(model), 0.05, 8);

        let materials = strategy.attempt(&medium_project()).await.unwrap();
        assert_eq!(materials.len(), 8);
        // expm1(3.0) = 19.08 -> 19; 19 * 2.0 * 0.05 * 5 = 9.5 -> 9
        assert!(materials.iter().all(|m| m.quantity == 9));
    }

    #[tokio::test]
    async fn model_names_are_reproducible() {
        let proba = {
            let mut p = vec![0.0; 20];
            p[0] = 0.5;
            p[2] = 0.5;
            p
        };
        let model: Arc<dyn MaterialModel> = Arc::new(StubModel::new(proba, None));
        let strategy = ModelStrategy::new(Some(model), 0.05, 8);

        let first = strategy.attempt(&medium_project()).await.unwrap();
        let second = strategy.attempt(&medium_project()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn same_category_clusters_get_distinct_names() {
        // Clusters 2, 8 and 11 all map to Drywall
        let mut proba = vec![0.0; 20];
        proba[2] = 0.4;
        proba[8] = 0.35;
        proba[11] = 0.25;
        let model: Arc<dyn MaterialModel> = Arc::new(StubModel::new(proba, None));
        let strategy = ModelStrategy::new(Some(model), 0.05, 8);

        let materials = strategy.attempt(&medium_project()).await.unwrap();
        assert_eq!(materials.len(), 3);
        assert!(materials.iter().all(|m| m.category == MaterialCategory::Drywall));

        let mut names: Vec<&str> = materials.iter().map(|m| m.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);
    }

    #[tokio::test]
    async fn rule_strategy_returns_eight_materials() {
        let materials = RuleStrategy.attempt(&medium_project()).await.unwrap();
        assert_eq!(materials.len(), 8);
        assert_eq!(materials[0].name, "Structural Steel");
        assert_eq!(materials[0].quantity, 3_750);
    }

    #[tokio::test]
    async fn essential_strategy_returns_two_materials() {
        let materials = EssentialStrategy.attempt(&medium_project()).await.unwrap();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].name, "Concrete Foundation");
        assert_eq!(materials[0].quantity, 100);
        assert_eq!(materials[1].name, "Basic Steel Structure");
        assert_eq!(materials[1].quantity, 20);
    }
}
