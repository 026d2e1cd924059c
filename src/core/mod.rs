//! Core domain models for asset builds
//!
//! This module defines the build parameters, the two pipeline
//! specifications, and the naming, cleanup and manifest pieces every
//! pipeline run is made of.

pub mod clean;
pub mod config;
pub mod context;
pub mod error;
pub mod manifest;
pub mod naming;
pub mod params;
pub mod pipeline;
pub mod source_map;
pub mod state;

pub use context::*;
pub use error::BuildError;
pub use manifest::{Manifest, ManifestRecorder, MANIFEST_FILENAME};
pub use naming::{AssetName, ContentHashNamer, HashedName, NamingTemplate};
pub use params::BuildParameters;
pub use pipeline::*;
pub use state::*;
