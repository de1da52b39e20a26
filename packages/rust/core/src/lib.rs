//! Resilient multi-strategy estimation pipeline for SmartBuy.
//!
//! This crate provides:
//! - [`Strategy`] and [`Validator`] — the seams every estimation domain plugs into
//! - [`Cascade`] — runs strategies in order until one is accepted
//! - [`annotate`] — stamps accepted results with provenance and confidence

pub mod annotate;
pub mod runner;
pub mod strategy;

pub use annotate::annotate;
pub use runner::{Attempt, AttemptOutcome, Cascade};
pub use strategy::{Strategy, Validator};
