//! Confidence/provenance stamping of accepted results.

use tracing::debug;

use smartbuy_shared::{CascadeResult, Provenance};

/// Stamp the winning strategy's items with its source tag and confidence.
pub fn annotate<T, S: Provenance>(items: Vec<T>, source: S) -> CascadeResult<T, S> {
    let result = CascadeResult::new(items, source);
    debug!(
        source = source.label(),
        confidence = result.confidence(),
        synthetic = result.is_synthetic(),
        items = result.items().len(),
        "result annotated"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartbuy_shared::{MaterialSource, VendorSource};

    #[test]
    fn annotate_uses_source_confidence() {
        let result = annotate(vec![1, 2, 3], MaterialSource::Model);
        assert_eq!(result.items(), &[1, 2, 3]);
        assert_eq!(result.source(), MaterialSource::Model);
        assert!((result.confidence() - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn synthetic_vendors_are_flagged() {
        let result = annotate(vec!["ABC Cement Suppliers"], VendorSource::Synthetic);
        assert!(result.is_synthetic());
        assert!(result.confidence() < VendorSource::Live.confidence());
    }
}
