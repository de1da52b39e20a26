//! Placeholder vendors used when no real listing can be obtained.

use smartbuy_shared::{VendorRecord, VendorRequest};

use crate::extract::{DEFAULT_LOCATION, DEFAULT_UNIT};

/// Material name used when the request carries none.
const FALLBACK_MATERIAL: &str = "Building Material";

struct Template {
    prefix: &'static str,
    suffix: &'static str,
    website: &'static str,
    rating: f32,
    rating_count: u32,
    grade: &'static str,
    price: &'static str,
    verified_trustseal: bool,
    member_since: &'static str,
    contact: &'static str,
}

const TEMPLATES: [Template; 3] = [
    Template {
        prefix: "ABC",
        suffix: "Suppliers",
        website: "https://example.com",
        rating: 4.5,
        rating_count: 120,
        grade: "Premium",
        price: "₹1,500",
        verified_trustseal: true,
        member_since: "5 years",
        contact: "+91 9876543210",
    },
    Template {
        prefix: "XYZ",
        suffix: "Traders",
        website: "https://example2.com",
        rating: 4.2,
        rating_count: 85,
        grade: "Standard",
        price: "₹1,200",
        verified_trustseal: false,
        member_since: "3 years",
        contact: "+91 9876543211",
    },
    Template {
        prefix: "PQR",
        suffix: "Industries",
        website: "https://example3.com",
        rating: 4.8,
        rating_count: 200,
        grade: "Industrial",
        price: "₹2,000",
        verified_trustseal: true,
        member_since: "8 years",
        contact: "+91 9876543212",
    },
];

/// Three templated vendors for `request`. A pure function of its input.
pub fn synthetic_vendors(request: &VendorRequest) -> Vec<VendorRecord> {
    let material = match request.material_name.trim() {
        "" => FALLBACK_MATERIAL,
        m => m,
    };
    let location = match request.location.trim() {
        "" => DEFAULT_LOCATION,
        l => l,
    };

    TEMPLATES
        .iter()
        .zip(1u32..)
        .map(|(t, id)| VendorRecord {
            id,
            vendor_name: format!("{} {material} {}", t.prefix, t.suffix),
            website: Some(t.website.to_string()),
            rating: Some(t.rating),
            rating_count: Some(t.rating_count),
            item_name: format!("{} {material}", t.grade),
            item_price: t.price.to_string(),
            item_unit: DEFAULT_UNIT.to_string(),
            verified_gst: true,
            verified_trustseal: t.verified_trustseal,
            member_since: Some(t.member_since.to_string()),
            location: location.to_string(),
            contact: t.contact.to_string(),
        })
        .collect()
}
