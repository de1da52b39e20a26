//! Material estimation cascade.
//!
//! This crate provides:
//! - [`MaterialCascade`] — model → rule → essential-set estimation
//! - [`MaterialModel`] / [`LinearModel`] — the optional trained model capability
//! - [`ProjectProfile`] — normalised project attributes and model features
//! - [`EstimateSummary`] — total cost and cost breakdown of an estimate

pub mod catalog;
pub mod features;
pub mod model;
pub mod strategies;
pub mod validator;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use smartbuy_core::{Attempt, Cascade, Strategy};
use smartbuy_shared::{
    CascadeResult, MaterialEstimate, MaterialRequest, MaterialSource, MaterialsConfig, Result,
};

pub use features::{FEATURE_NAMES, FeatureVector, ProjectProfile};
pub use model::{ClusterMap, LabelEncoders, LinearModel, MaterialModel, ModelInfo};
pub use strategies::{EssentialStrategy, ModelStrategy, RuleStrategy};
pub use validator::MaterialValidator;

/// Accepted output of a material estimate.
pub type MaterialResult = CascadeResult<MaterialEstimate, MaterialSource>;

// ---------------------------------------------------------------------------
// MaterialCascade
// ---------------------------------------------------------------------------

/// Estimates project materials, degrading from model to rules to the
/// essential set.
pub struct MaterialCascade {
    cascade: Cascade<ProjectProfile, MaterialEstimate, MaterialSource>,
    model_info: ModelInfo,
}

impl MaterialCascade {
    /// Build the cascade around an already-loaded model (or none).
    pub fn new(config: &MaterialsConfig, model: Option<Arc<dyn MaterialModel>>) -> Result<Self> {
        let model_info = ModelInfo::of(model.as_deref());
        let strategies: Vec<Box<dyn Strategy<ProjectProfile, MaterialEstimate, MaterialSource>>> = vec![
            Box::new(ModelStrategy::new(model, config.min_probability, config.top_k)),
            Box::new(RuleStrategy),
            Box::new(EssentialStrategy),
        ];
        let validator = MaterialValidator::new(config.min_materials, config.max_materials);
        let cascade = Cascade::new("materials", strategies, Box::new(validator))?;

        Ok(Self {
            cascade,
            model_info,
        })
    }

    /// Build the cascade, loading the model artifact named in `config`.
    ///
    /// A missing or unreadable artifact is logged and the cascade runs
    /// without a model.
    pub fn from_config(config: &MaterialsConfig) -> Result<Self> {
        let model = match &config.model_path {
            Some(path) => match LinearModel::load(path) {
                Ok(model) => Some(Arc::new(model) as Arc<dyn MaterialModel>),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "model unavailable, continuing without it");
                    None
                }
            },
            None => None,
        };
        Self::new(config, model)
    }

    /// Status of the model capability this cascade was built with.
    pub fn model_info(&self) -> &ModelInfo {
        &self.model_info
    }

    /// Estimate materials for `request`.
    pub async fn estimate(&self, request: &MaterialRequest) -> Result<MaterialResult> {
        self.estimate_with_attempts(request)
            .await
            .map(|(result, _)| result)
    }

    /// Estimate materials, also returning the per-strategy attempts.
    #[instrument(skip_all, fields(project_type = %request.project_type, size = %request.size_category))]
    pub async fn estimate_with_attempts(
        &self,
        request: &MaterialRequest,
    ) -> Result<(MaterialResult, Vec<Attempt>)> {
        let profile = ProjectProfile::from(request);
        let (result, attempts) = self.cascade.run_with_attempts(&profile).await?;

        info!(
            source = ?result.source(),
            materials = result.items().len(),
            confidence = result.confidence_percent(),
            "material estimate ready"
        );
        Ok((result, attempts))
    }
}

// ---------------------------------------------------------------------------
// EstimateSummary
// ---------------------------------------------------------------------------

/// One material's share of the estimate's total cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostShare {
    pub material: String,
    pub cost: u64,
    /// Percentage of total cost, rounded to two decimals.
    pub percentage: f64,
}

/// Totals over an accepted estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateSummary {
    pub total_materials: usize,
    pub total_cost: u64,
    /// The five most expensive materials.
    pub cost_breakdown: Vec<CostShare>,
}

impl EstimateSummary {
    pub fn of(materials: &[MaterialEstimate]) -> Self {
        let total_cost = materials
            .iter()
            .fold(0u64, |acc, m| acc.saturating_add(m.cost));
        let cost_breakdown = materials
            .iter()
            .take(5)
            .map(|m| CostShare {
                material: m.name.clone(),
                cost: m.cost,
                percentage: if total_cost == 0 {
                    0.0
                } else {
                    (m.cost as f64 / total_cost as f64 * 10_000.0).round() / 100.0
                },
            })
            .collect();

        Self {
            total_materials: materials.len(),
            total_cost,
            cost_breakdown,
        }
    }
}
