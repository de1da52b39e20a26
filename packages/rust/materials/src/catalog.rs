//! Read-only material tables: per-category costs, name variants, the
//! ratio rules and the essential set.

use sha2::{Digest, Sha256};

use smartbuy_shared::{MaterialCategory, MaterialEstimate};

/// Base cost per unit and unit of measure for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostEntry {
    pub base_cost: u64,
    pub unit: &'static str,
}

/// Cost table lookup. Every category has an entry.
pub fn cost_of(category: MaterialCategory) -> CostEntry {
    use MaterialCategory::*;

    let (base_cost, unit) = match category {
        Steel => (125_000, "tons"),
        Drywall => (11_400, "m³"),
        Hvac => (1_166_667, "units"),
        ElectricalEquipment => (15_000, "units"),
        HardwareFasteners => (5_000, "kg"),
        Cables => (3_000, "m"),
        PlumbingFixtures => (54_444, "units"),
        GlassWindows => (62_500, "m²"),
        Flooring => (2_500, "m²"),
        WoodCarpentry => (8_000, "m³"),
        Cement => (15_000, "tons"),
        Misc => (2_000, "units"),
    };
    CostEntry { base_cost, unit }
}

/// Quantity multiplier for a building size (sq. ft).
pub fn size_multiplier(building_size: f64) -> f64 {
    if building_size < 5_000.0 {
        0.5
    } else if building_size < 25_000.0 {
        1.0
    } else if building_size < 100_000.0 {
        2.0
    } else {
        3.0
    }
}

// ---------------------------------------------------------------------------
// Name variants
// ---------------------------------------------------------------------------

fn name_variants(category: MaterialCategory) -> [&'static str; 3] {
    use MaterialCategory::*;

    match category {
        Steel => ["Structural Steel Beams", "Steel Reinforcement", "Metal Framing"],
        Drywall => ["Gypsum Drywall", "Ceiling Tiles", "Joint Compound"],
        Hvac => ["HVAC System", "Air Conditioning", "Ventilation"],
        ElectricalEquipment => ["Electrical Panel", "Wiring System", "Circuit Breakers"],
        HardwareFasteners => ["Construction Screws", "Bolts & Nuts", "Metal Brackets"],
        Cables => ["Power Cables", "Network Cables", "Control Cables"],
        PlumbingFixtures => ["Plumbing System", "Water Supply", "Drainage"],
        GlassWindows => ["Glass Panels", "Window Systems", "Curtain Wall"],
        Cement => ["Concrete Mix", "Portland Cement", "Precast Elements"],
        Flooring => ["Vitrified Tiles", "Floor Screed", "Laminate Flooring"],
        WoodCarpentry => ["Plywood Sheets", "Door Frames", "Timber Joinery"],
        Misc => ["Construction Tools", "Safety Equipment", "General Supplies"],
    }
}

/// Pick one of the category's name variants, keyed on a stable hash of the
/// request so the same project always gets the same names.
///
/// `occurrence` counts earlier lines of the same category in one estimate;
/// each one moves to the next variant, so up to three lines of a category
/// get distinct names.
pub fn material_name(
    request_key: &str,
    category: MaterialCategory,
    occurrence: usize,
) -> &'static str {
    let mut hasher = Sha256::new();
    hasher.update(request_key.as_bytes());
    hasher.update([0x1f]);
    hasher.update(category.as_str().as_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let variants = name_variants(category);
    let start = (u64::from_be_bytes(head) % variants.len() as u64) as usize;
    variants[(start + occurrence) % variants.len()]
}

// ---------------------------------------------------------------------------
// Ratio rules
// ---------------------------------------------------------------------------

/// A material whose quantity scales linearly with building size.
#[derive(Debug, Clone, Copy)]
pub struct RatioRule {
    pub name: &'static str,
    pub category: MaterialCategory,
    pub ratio: f64,
    pub unit: &'static str,
}

/// The eight rule-based materials.
pub const RATIO_RULES: [RatioRule; 8] = [
    RatioRule {
        name: "Structural Steel",
        category: MaterialCategory::Steel,
        ratio: 0.15,
        unit: "tons",
    },
    RatioRule {
        name: "Concrete (M40)",
        category: MaterialCategory::Cement,
        ratio: 0.8,
        unit: "m³",
    },
    RatioRule {
        name: "Drywall Sheets",
        category: MaterialCategory::Drywall,
        ratio: 2.0,
        unit: "m²",
    },
    RatioRule {
        name: "HVAC Systems",
        category: MaterialCategory::Hvac,
        ratio: 0.0002,
        unit: "units",
    },
    RatioRule {
        name: "Electrical Work",
        category: MaterialCategory::ElectricalEquipment,
        ratio: 0.5,
        unit: "m",
    },
    RatioRule {
        name: "Hardware Items",
        category: MaterialCategory::HardwareFasteners,
        ratio: 0.02,
        unit: "kg",
    },
    RatioRule {
        name: "Plumbing Work",
        category: MaterialCategory::PlumbingFixtures,
        ratio: 0.0015,
        unit: "units",
    },
    RatioRule {
        name: "Glass Work",
        category: MaterialCategory::GlassWindows,
        ratio: 0.3,
        unit: "m²",
    },
];

/// Apply every ratio rule to `building_size`.
pub fn ratio_materials(building_size: f64) -> Vec<MaterialEstimate> {
    RATIO_RULES
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let quantity = floor_at_least_one(building_size * rule.ratio);
            MaterialEstimate {
                id: (i + 1).to_string(),
                name: rule.name.to_string(),
                category: rule.category,
                quantity,
                unit: rule.unit.to_string(),
                cost: cost_of(rule.category).base_cost.saturating_mul(quantity),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Essential set
// ---------------------------------------------------------------------------

struct Essential {
    name: &'static str,
    category: MaterialCategory,
    base_quantity: f64,
    unit_cost: u64,
}

const ESSENTIALS: [Essential; 2] = [
    Essential {
        name: "Concrete Foundation",
        category: MaterialCategory::Cement,
        base_quantity: 50.0,
        unit_cost: 8_000,
    },
    Essential {
        name: "Basic Steel Structure",
        category: MaterialCategory::Steel,
        base_quantity: 10.0,
        unit_cost: 120_000,
    },
];

/// The two materials every structure needs, scaled by building size.
pub fn essential_materials(building_size: f64) -> Vec<MaterialEstimate> {
    let multiplier = size_multiplier(building_size);
    ESSENTIALS
        .iter()
        .enumerate()
        .map(|(i, essential)| {
            let quantity = floor_at_least_one(essential.base_quantity * multiplier);
            let unit = match essential.category {
                MaterialCategory::Steel => "tons",
                _ => "m³",
            };
            MaterialEstimate {
                id: (i + 10).to_string(),
                name: essential.name.to_string(),
                category: essential.category,
                quantity,
                unit: unit.to_string(),
                cost: essential.unit_cost.saturating_mul(quantity),
            }
        })
        .collect()
}

/// `max(1, floor(value))`, saturating; non-finite or negative input gives 1.
pub(crate) fn floor_at_least_one(value: f64) -> u64 {
    if value.is_finite() && value >= 1.0 {
        value.floor() as u64
    } else if value == f64::INFINITY {
        u64::MAX
    } else {
        1
    }
}
