//! Spectrum OFL Core - fixture models and OFL to Spectrum conversion
//!
//! This crate provides:
//! - The Open Fixture Library source model, normalized at ingestion
//! - The Spectrum fixture manifest model
//! - Matrix detection, template channel expansion, and capability normalization
//! - The field-by-field schema conversion

pub mod capability;
pub mod convert;
pub mod matrix;
pub mod ofl;
pub mod spectrum;
pub mod template;

pub use capability::normalize_capabilities;
pub use convert::{convert_fixture, ConvertOptions};
pub use matrix::{has_matrix, Matrix};
pub use ofl::{CapabilityField, FixtureError, ModeChannel, SourceFixture};
pub use spectrum::SpectrumFixture;
pub use template::resolve_template_channels;
