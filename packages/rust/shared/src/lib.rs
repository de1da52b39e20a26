//! Shared types, error model, and configuration for SmartBuy.
//!
//! This crate is the foundation depended on by all other SmartBuy crates.
//! It provides:
//! - [`SmartBuyError`] and [`StrategyError`] — the error model
//! - Domain types ([`MaterialRequest`], [`MaterialEstimate`], [`VendorRecord`], [`CascadeResult`])
//! - Configuration ([`AppConfig`], [`MaterialsConfig`], [`VendorSearchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, MATERIALS_CEILING, MATERIALS_FLOOR, MaterialsConfig, MaterialsSection,
    ModelSection, VendorSearchConfig, VendorsSection, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_limits,
};
pub use error::{Result, SmartBuyError, StrategyError, StrategyResult};
pub use types::{
    CascadeResult, EstimationRequest, MaterialCategory, MaterialEstimate, MaterialRequest,
    MaterialSource, Provenance, UNKNOWN_VENDOR, VendorRecord, VendorRequest, VendorSource,
};
