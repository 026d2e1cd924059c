//! Style transform chain: utility-class generation, then vendor prefixing
//!
//! Utility generation runs on the authored stylesheet so it sees the
//! original selectors; prefixing runs on its expanded output.

use crate::core::config::{parse_browser_version, BrowserTargets};
use crate::engine::{EngineCommand, EngineError};
use async_trait::async_trait;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_STEM: &str = "tailwind.config";
const CONFIG_EXTENSIONS: &[&str] = &["ts", "js", "cjs", "mjs"];

/// Find `{config_root}/tailwind.config.*`
pub async fn locate_config(config_root: &Path) -> Result<PathBuf, EngineError> {
    for ext in CONFIG_EXTENSIONS {
        let candidate = config_root.join(format!("{}.{}", CONFIG_STEM, ext));
        if let Ok(metadata) = tokio::fs::metadata(&candidate).await {
            if metadata.is_file() {
                return Ok(candidate);
            }
        }
    }
    Err(EngineError::ConfigNotFound(config_root.join(format!("{}.*", CONFIG_STEM))))
}

/// Trait for utility-class generation - allows for different implementations
#[async_trait]
pub trait UtilityGenerator: Send + Sync {
    /// Expand the utilities used by `input` according to `config`
    async fn generate(&self, input: &Path, config: &Path) -> Result<String, EngineError>;
}

/// Utility generator backed by the `tailwindcss` CLI.
///
/// Runs `tailwindcss --config <config> --input <input>`, which prints the
/// expanded stylesheet on stdout.
#[derive(Debug, Clone)]
pub struct TailwindClient {
    command: EngineCommand,
}

impl TailwindClient {
    pub fn new(command: EngineCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl UtilityGenerator for TailwindClient {
    async fn generate(&self, input: &Path, config: &Path) -> Result<String, EngineError> {
        info!("Generating utilities for {} with {}", input.display(), self.command.program());
        let args: Vec<OsString> = vec![
            "--config".into(),
            config.as_os_str().to_owned(),
            "--input".into(),
            input.as_os_str().to_owned(),
        ];
        self.command.run(&args).await
    }
}

/// Adds vendor prefixes for a set of browser targets
#[derive(Debug, Clone)]
pub struct Prefixer {
    targets: Targets,
}

impl Prefixer {
    pub fn new(targets: &BrowserTargets) -> Self {
        let version = |v: &Option<String>| v.as_deref().and_then(parse_browser_version);
        let browsers = Browsers {
            android: version(&targets.android),
            chrome: version(&targets.chrome),
            edge: version(&targets.edge),
            firefox: version(&targets.firefox),
            ios_saf: version(&targets.ios_saf),
            opera: version(&targets.opera),
            safari: version(&targets.safari),
            samsung: version(&targets.samsung),
            ..Browsers::default()
        };
        Self {
            targets: Targets {
                browsers: Some(browsers),
                ..Targets::default()
            },
        }
    }

    /// Parse `css`, add the prefixes the targets need and print it back
    pub fn prefix(&self, css: &str, filename: &str) -> Result<String, EngineError> {
        let mut sheet = StyleSheet::parse(
            css,
            ParserOptions {
                filename: filename.to_string(),
                ..ParserOptions::default()
            },
        )
        .map_err(|e| EngineError::Transform(e.to_string()))?;

        sheet
            .minify(MinifyOptions {
                targets: self.targets.clone(),
                ..MinifyOptions::default()
            })
            .map_err(|e| EngineError::Transform(e.to_string()))?;

        let printed = sheet
            .to_css(PrinterOptions {
                targets: self.targets.clone(),
                ..PrinterOptions::default()
            })
            .map_err(|e| EngineError::Transform(e.to_string()))?;

        Ok(printed.code)
    }
}

/// Utility generation followed by prefixing
pub struct StyleTransformChain<G> {
    generator: G,
    prefixer: Prefixer,
}

impl<G: UtilityGenerator> StyleTransformChain<G> {
    pub fn new(generator: G, prefixer: Prefixer) -> Self {
        Self {
            generator,
            prefixer,
        }
    }

    /// Transform the stylesheet at `entry` using the config under `config_root`
    pub async fn transform(&self, entry: &Path, config_root: &Path) -> Result<String, EngineError> {
        let config = locate_config(config_root).await?;
        debug!("Using style config {}", config.display());

        let expanded = self.generator.generate(entry, &config).await?;
        let filename = entry
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.prefixer.prefix(&expanded, &filename)
    }
}
