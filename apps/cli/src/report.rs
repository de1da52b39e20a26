//! JSON reports printed by the CLI commands.

use chrono::{DateTime, Utc};
use serde::Serialize;

use smartbuy_core::Attempt;
use smartbuy_materials::{EstimateSummary, MaterialResult, ModelInfo};
use smartbuy_shared::{MaterialRequest, VendorRequest};
use smartbuy_vendors::{VendorResult, VendorSummary};

/// Output of `smartbuy predict`.
#[derive(Debug, Serialize)]
pub(crate) struct PredictReport<'a> {
    pub request: &'a MaterialRequest,
    #[serde(flatten)]
    pub result: &'a MaterialResult,
    pub confidence_percent: f64,
    pub summary: EstimateSummary,
    pub model: &'a ModelInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl<'a> PredictReport<'a> {
    pub(crate) fn new(
        request: &'a MaterialRequest,
        result: &'a MaterialResult,
        model: &'a ModelInfo,
        attempts: &[Attempt],
    ) -> Self {
        Self {
            request,
            result,
            confidence_percent: result.confidence_percent(),
            summary: EstimateSummary::of(result.items()),
            model,
            attempts: attempts.iter().map(ToString::to_string).collect(),
            generated_at: Utc::now(),
        }
    }
}

/// Output of `smartbuy vendors`.
#[derive(Debug, Serialize)]
pub(crate) struct VendorReport<'a> {
    pub request: &'a VendorRequest,
    #[serde(flatten)]
    pub result: &'a VendorResult,
    pub confidence_percent: f64,
    pub summary: VendorSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl<'a> VendorReport<'a> {
    pub(crate) fn new(
        request: &'a VendorRequest,
        result: &'a VendorResult,
        attempts: &[Attempt],
    ) -> Self {
        Self {
            request,
            result,
            confidence_percent: result.confidence_percent(),
            summary: VendorSummary::of(result.items()),
            attempts: attempts.iter().map(ToString::to_string).collect(),
            generated_at: Utc::now(),
        }
    }
}

/// A named sample project for `smartbuy demo`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SampleProject {
    pub name: &'static str,
    pub request: MaterialRequest,
}

fn sample(
    name: &'static str,
    project_type: &str,
    size_category: &str,
    state: &str,
    city: &str,
    volume: &str,
) -> SampleProject {
    SampleProject {
        name,
        request: MaterialRequest {
            project_type: project_type.into(),
            size_category: size_category.into(),
            state: state.into(),
            city: city.into(),
            volume: volume.into(),
            num_floors: None,
        },
    }
}

pub(crate) fn sample_projects() -> Vec<SampleProject> {
    vec![
        sample(
            "Mumbai Office Complex",
            "Commercial Construction",
            "Large (>₹10Cr)",
            "Maharashtra",
            "Mumbai",
            "125000000",
        ),
        sample(
            "Bangalore Tech Park",
            "Industrial Infrastructure",
            "Medium (₹1Cr–₹10Cr)",
            "Karnataka",
            "Bengaluru",
            "65000000",
        ),
        sample(
            "Pune Residential",
            "Residential Development",
            "Small (<₹1Cr)",
            "Maharashtra",
            "Pune",
            "8500000",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartbuy_materials::MaterialCascade;
    use smartbuy_shared::MaterialsConfig;

    #[tokio::test]
    async fn predict_report_flattens_result() {
        let cascade = MaterialCascade::new(&MaterialsConfig::default(), None).unwrap();
        let request = sample_projects().remove(0).request;
        let (result, attempts) = cascade.estimate_with_attempts(&request).await.unwrap();

        let report = PredictReport::new(&request, &result, cascade.model_info(), &attempts);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["source"], "RULE");
        assert_eq!(json["confidence_percent"], 85.0);
        assert_eq!(json["items"].as_array().unwrap().len(), 8);
        assert_eq!(json["model"]["classifier_loaded"], false);
        assert_eq!(json["attempts"].as_array().unwrap().len(), 2);
        assert!(json["generated_at"].is_string());
    }

    #[test]
    fn vendor_report_counts_synthetic_vendors() {
        let request = VendorRequest {
            material_name: "Glass".into(),
            location: "Delhi".into(),
        };
        let result = smartbuy_core::annotate(
            smartbuy_vendors::synthetic_vendors(&request),
            smartbuy_shared::VendorSource::Synthetic,
        );
        let report = VendorReport::new(&request, &result, &[]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["source"], "SYNTHETIC");
        assert_eq!(json["summary"]["total_vendors"], 3);
        assert!(json.get("attempts").is_none());
    }

    #[test]
    fn three_sample_projects() {
        let projects = sample_projects();
        assert_eq!(projects.len(), 3);
        assert_eq!(projects[2].request.city, "Pune");
    }
}
