//! Acceptance gate for vendor strategies.

use tracing::debug;

use smartbuy_core::Validator;
use smartbuy_shared::{
    StrategyError, StrategyResult, UNKNOWN_VENDOR, VendorRecord, VendorSource,
};

use crate::strategies::VendorSearch;

/// Whether `name` identifies a real vendor.
pub fn is_valid_vendor_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name != UNKNOWN_VENDOR && name.chars().count() > 3
}

/// Drops records with unusable vendor names and caps the rest.
///
/// Bad records are removed one by one; only an empty survivor set rejects
/// the strategy. Synthetic vendors are a fixed set of three and are never
/// capped. Accepted records are renumbered from 1.
pub struct VendorValidator {
    max_results: usize,
}

impl VendorValidator {
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results: max_results.max(1),
        }
    }
}

impl Validator<VendorSearch, VendorRecord, VendorSource> for VendorValidator {
    fn validate(
        &self,
        _search: &VendorSearch,
        source: VendorSource,
        mut items: Vec<VendorRecord>,
    ) -> StrategyResult<Vec<VendorRecord>> {
        let found = items.len();
        items.retain(|v| is_valid_vendor_name(&v.vendor_name));

        if items.is_empty() {
            return Err(StrategyError::Rejected(format!(
                "none of {found} records had a usable vendor name"
            )));
        }
        if items.len() < found {
            debug!(
                source = ?source,
                dropped = found - items.len(),
                "dropped records with unusable vendor names"
            );
        }

        if source != VendorSource::Synthetic {
            items.truncate(self.max_results);
        }
        for (record, id) in items.iter_mut().zip(1u32..) {
            record.id = id;
        }
        Ok(items)
    }
}
