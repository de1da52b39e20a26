//! Vendor discovery cascade.
//!
//! This crate provides:
//! - [`VendorCascade`] — live fetch → relaxed re-read → synthetic vendors
//! - [`PageFetcher`] / [`HttpFetcher`] — the outbound HTTP capability
//! - [`ListingExtractor`] — structural and relaxed listing extraction
//! - [`VendorSummary`] — counts over an accepted vendor set

pub mod extract;
pub mod fetch;
pub mod strategies;
pub mod synthetic;
pub mod validator;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use smartbuy_core::{Attempt, Cascade, Strategy};
use smartbuy_shared::{
    CascadeResult, Result, VendorRecord, VendorRequest, VendorSearchConfig, VendorSource,
};

pub use extract::{CARD_SELECTORS, ListingExtractor};
pub use fetch::{HttpFetcher, PageFetcher, search_url};
pub use strategies::{HeuristicStrategy, LiveStrategy, SyntheticStrategy, VendorSearch};
pub use synthetic::synthetic_vendors;
pub use validator::{VendorValidator, is_valid_vendor_name};

/// Accepted output of a vendor search.
pub type VendorResult = CascadeResult<VendorRecord, VendorSource>;

// ---------------------------------------------------------------------------
// VendorCascade
// ---------------------------------------------------------------------------

/// Finds vendors for a material, degrading from the live directory to
/// placeholders.
pub struct VendorCascade {
    cascade: Cascade<VendorSearch, VendorRecord, VendorSource>,
}

impl VendorCascade {
    /// Build the cascade around the given fetcher.
    pub fn new(config: &VendorSearchConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let extractor = Arc::new(ListingExtractor::new(
            &config.vendor_link_pattern,
            config.max_candidates,
        )?);

        let strategies: Vec<Box<dyn Strategy<VendorSearch, VendorRecord, VendorSource>>> = vec![
            Box::new(LiveStrategy::new(
                fetcher,
                extractor.clone(),
                config.search_url.clone(),
                config.delay_ms,
            )),
            Box::new(HeuristicStrategy::new(extractor)),
            Box::new(SyntheticStrategy),
        ];
        let validator = VendorValidator::new(config.max_results);
        let cascade = Cascade::new("vendors", strategies, Box::new(validator))?;

        Ok(Self { cascade })
    }

    /// Build the cascade with an HTTP fetcher using the configured timeout.
    pub fn from_config(config: &VendorSearchConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.timeout)?;
        Self::new(config, Arc::new(fetcher))
    }

    /// Find vendors for `request`.
    pub async fn search(&self, request: &VendorRequest) -> Result<VendorResult> {
        self.search_with_attempts(request)
            .await
            .map(|(result, _)| result)
    }

    /// Find vendors, also returning the per-strategy attempts.
    #[instrument(skip_all, fields(material = %request.material_name, location = %request.location))]
    pub async fn search_with_attempts(
        &self,
        request: &VendorRequest,
    ) -> Result<(VendorResult, Vec<Attempt>)> {
        let search = VendorSearch::new(request.clone());
        let (result, attempts) = self.cascade.run_with_attempts(&search).await?;

        info!(
            source = ?result.source(),
            vendors = result.items().len(),
            synthetic = result.is_synthetic(),
            "vendor search ready"
        );
        Ok((result, attempts))
    }
}

// ---------------------------------------------------------------------------
// VendorSummary
// ---------------------------------------------------------------------------

/// Counts over an accepted vendor set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorSummary {
    pub total_vendors: usize,
    /// Vendors with a real contact, not the placeholder.
    pub with_contact: usize,
    pub with_rating: usize,
    /// Vendors with GST or TrustSEAL verification.
    pub verified: usize,
}

impl VendorSummary {
    pub fn of(vendors: &[VendorRecord]) -> Self {
        Self {
            total_vendors: vendors.len(),
            with_contact: vendors
                .iter()
                .filter(|v| !v.contact.is_empty() && v.contact != extract::CONTACT_PLACEHOLDER)
                .count(),
            with_rating: vendors.iter().filter(|v| v.rating.is_some()).count(),
            verified: vendors
                .iter()
                .filter(|v| v.verified_gst || v.verified_trustseal)
                .count(),
        }
    }
}
