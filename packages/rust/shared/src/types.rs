//! Core domain types for SmartBuy estimates.

use serde::{Deserialize, Serialize};

/// Placeholder name given to listings whose vendor could not be extracted.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Project attributes for a material estimate, as entered by the user.
///
/// Every field is free text; normalisation to numbers and codes happens in
/// the material cascade and never rejects a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequest {
    #[serde(default)]
    pub project_type: String,
    /// Size label such as `Medium (₹1Cr–₹10Cr)`, or a bare building size.
    #[serde(default)]
    pub size_category: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    /// Project volume (budget), kept as entered.
    #[serde(default)]
    pub volume: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_floors: Option<u32>,
}

/// A material + location vendor lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRequest {
    pub material_name: String,
    #[serde(default)]
    pub location: String,
}

/// Either kind of estimation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimationRequest {
    Material(MaterialRequest),
    Vendor(VendorRequest),
}

// ---------------------------------------------------------------------------
// MaterialCategory
// ---------------------------------------------------------------------------

/// The fixed set of material categories an estimate can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialCategory {
    Steel,
    Cement,
    Drywall,
    #[serde(rename = "HVAC")]
    Hvac,
    #[serde(rename = "Electrical Equipment")]
    ElectricalEquipment,
    #[serde(rename = "Hardware & Fasteners")]
    HardwareFasteners,
    Cables,
    #[serde(rename = "Plumbing Fixtures")]
    PlumbingFixtures,
    #[serde(rename = "Glass & Windows")]
    GlassWindows,
    Flooring,
    #[serde(rename = "Wood & Carpentry")]
    WoodCarpentry,
    Misc,
}

impl MaterialCategory {
    /// Every category, in declaration order.
    pub const ALL: [MaterialCategory; 12] = [
        Self::Steel,
        Self::Cement,
        Self::Drywall,
        Self::Hvac,
        Self::ElectricalEquipment,
        Self::HardwareFasteners,
        Self::Cables,
        Self::PlumbingFixtures,
        Self::GlassWindows,
        Self::Flooring,
        Self::WoodCarpentry,
        Self::Misc,
    ];

    /// Human-readable category name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Steel => "Steel",
            Self::Cement => "Cement",
            Self::Drywall => "Drywall",
            Self::Hvac => "HVAC",
            Self::ElectricalEquipment => "Electrical Equipment",
            Self::HardwareFasteners => "Hardware & Fasteners",
            Self::Cables => "Cables",
            Self::PlumbingFixtures => "Plumbing Fixtures",
            Self::GlassWindows => "Glass & Windows",
            Self::Flooring => "Flooring",
            Self::WoodCarpentry => "Wood & Carpentry",
            Self::Misc => "Misc",
        }
    }
}

impl std::fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MaterialCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown material category: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One estimated material line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialEstimate {
    pub id: String,
    pub name: String,
    pub category: MaterialCategory,
    /// Always at least 1.
    pub quantity: u64,
    pub unit: String,
    /// Total cost of this line in rupees.
    pub cost: u64,
}

/// One vendor listing, either scraped or synthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorRecord {
    pub id: u32,
    pub vendor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u32>,
    pub item_name: String,
    pub item_price: String,
    pub item_unit: String,
    pub verified_gst: bool,
    pub verified_trustseal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_since: Option<String>,
    pub location: String,
    pub contact: String,
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// A strategy source tag that carries a confidence level.
pub trait Provenance: Copy + std::fmt::Debug + Send + Sync + 'static {
    /// Confidence in [0, 1] for results produced by this source.
    fn confidence(&self) -> f64;

    /// Whether results from this source are placeholders rather than real data.
    fn is_synthetic(&self) -> bool;

    /// Stable lowercase label for logs.
    fn label(&self) -> &'static str;
}

/// Which material strategy produced an accepted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialSource {
    Model,
    Rule,
    Synthetic,
}

impl Provenance for MaterialSource {
    fn confidence(&self) -> f64 {
        match self {
            Self::Model => 0.92,
            Self::Rule | Self::Synthetic => 0.85,
        }
    }

    fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Rule => "rule",
            Self::Synthetic => "synthetic",
        }
    }
}

/// Which vendor strategy produced an accepted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorSource {
    Live,
    Heuristic,
    Synthetic,
}

impl Provenance for VendorSource {
    fn confidence(&self) -> f64 {
        match self {
            Self::Live => 1.0,
            Self::Heuristic => 0.75,
            Self::Synthetic => 0.25,
        }
    }

    fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Heuristic => "heuristic",
            Self::Synthetic => "synthetic",
        }
    }
}

// ---------------------------------------------------------------------------
// CascadeResult
// ---------------------------------------------------------------------------

/// The accepted output of one cascade run.
///
/// Built exactly once per request; fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeResult<T, S> {
    items: Vec<T>,
    source: S,
    confidence: f64,
}

impl<T, S: Provenance> CascadeResult<T, S> {
    /// Stamp `items` with `source` and its confidence.
    pub fn new(items: Vec<T>, source: S) -> Self {
        let confidence = source.confidence().clamp(0.0, 1.0);
        Self {
            items,
            source,
            confidence,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn source(&self) -> S {
        self.source
    }

    /// Confidence as a fraction in [0, 1].
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Confidence on a 0–100 scale.
    pub fn confidence_percent(&self) -> f64 {
        (self.confidence * 100.0).round()
    }

    /// Whether the items are placeholders rather than real data.
    pub fn is_synthetic(&self) -> bool {
        self.source.is_synthetic()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
