//! External engines: the bundler and the style transform chain
//!
//! Both are black boxes behind traits so tests and embedders can swap the
//! default subprocess clients for their own implementations.

pub mod error;
pub mod esbuild;
pub mod process;
pub mod style;

use async_trait::async_trait;
use std::path::PathBuf;

pub use error::EngineError;
pub use esbuild::EsbuildClient;
pub use process::EngineCommand;
pub use style::{Prefixer, StyleTransformChain, TailwindClient, UtilityGenerator};

/// Module format of script bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Esm,
}

/// What to bundle and how
#[derive(Debug, Clone)]
pub struct BundleRequest {
    /// Entry file on disk
    pub entry: PathBuf,

    /// Module format; `None` for stylesheets
    pub format: Option<OutputFormat>,

    pub minify: bool,

    pub sourcemap: bool,
}

impl BundleRequest {
    /// Minified, source-mapped bundle of `entry`
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            format: None,
            minify: true,
            sourcemap: true,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// One file produced by the bundler, not yet named or written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOutput {
    /// File stem, e.g. `main`
    pub name: String,

    /// Extension without the dot, e.g. `js`
    pub extension: String,

    /// File content, possibly ending in a `sourceMappingURL` comment
    pub contents: String,

    /// Source map JSON, when one was produced
    pub source_map: Option<String>,
}

/// Trait for bundling - allows for different implementations
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Bundle the entry and return every output file
    async fn bundle(&self, request: &BundleRequest) -> Result<Vec<BundleOutput>, EngineError>;
}
