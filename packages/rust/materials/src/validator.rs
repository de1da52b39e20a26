//! Acceptance gate for material strategies.

use tracing::debug;

use smartbuy_core::Validator;
use smartbuy_shared::{MaterialEstimate, MaterialSource, StrategyError, StrategyResult};

use crate::catalog::essential_materials;
use crate::features::ProjectProfile;

/// Requires a minimum number of materials, then orders the accepted set by
/// cost (highest first) and truncates it.
///
/// A short model prediction is padded once with the essential set before the
/// count is checked. The essential-set strategy itself is the cascade's floor
/// and only has to be non-empty.
pub struct MaterialValidator {
    min_materials: usize,
    max_materials: usize,
}

impl MaterialValidator {
    pub fn new(min_materials: usize, max_materials: usize) -> Self {
        Self {
            min_materials,
            max_materials: max_materials.max(min_materials),
        }
    }
}

impl Validator<ProjectProfile, MaterialEstimate, MaterialSource> for MaterialValidator {
    fn validate(
        &self,
        project: &ProjectProfile,
        source: MaterialSource,
        mut items: Vec<MaterialEstimate>,
    ) -> StrategyResult<Vec<MaterialEstimate>> {
        if items.is_empty() {
            return Err(StrategyError::Rejected("no materials".into()));
        }

        match source {
            MaterialSource::Synthetic => {}
            MaterialSource::Model if items.len() < self.min_materials => {
                debug!(
                    predicted = items.len(),
                    "padding model prediction with essential materials"
                );
                items.extend(essential_materials(project.building_size));
            }
            _ => {}
        }

        if source != MaterialSource::Synthetic && items.len() < self.min_materials {
            return Err(StrategyError::Rejected(format!(
                "{} materials, need at least {}",
                items.len(),
                self.min_materials
            )));
        }

        items.sort_by(|a, b| b.cost.cmp(&a.cost));
        items.truncate(self.max_materials);
        Ok(items)
    }
}
