//! Build configuration from YAML

use crate::core::naming::{DEFAULT_HASH_LENGTH, MAX_HASH_LENGTH, MIN_HASH_LENGTH};
use crate::execution::SchedulingStrategy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for a build; every field has a default so the file is optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Bundler executable
    pub esbuild: String,

    /// Utility-class generator executable
    pub tailwindcss: String,

    /// Timeout for each engine invocation (in seconds)
    pub timeout_secs: u64,

    /// Number of hex characters of the content hash kept in file names
    pub hash_length: usize,

    /// How the two pipelines are scheduled
    pub strategy: SchedulingStrategy,

    /// Browsers vendor prefixes are generated for
    pub targets: BrowserTargets,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            esbuild: "esbuild".to_string(),
            tailwindcss: "tailwindcss".to_string(),
            timeout_secs: 120,
            hash_length: DEFAULT_HASH_LENGTH,
            strategy: SchedulingStrategy::default(),
            targets: BrowserTargets::default(),
        }
    }
}

/// Minimum browser versions, written as `major` or `major.minor`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserTargets {
    pub android: Option<String>,
    pub chrome: Option<String>,
    pub edge: Option<String>,
    pub firefox: Option<String>,
    pub ios_saf: Option<String>,
    pub opera: Option<String>,
    pub safari: Option<String>,
    pub samsung: Option<String>,
}

impl BrowserTargets {
    /// Targets used when the configuration names none
    pub fn defaults() -> Self {
        Self {
            chrome: Some("80".to_string()),
            edge: Some("80".to_string()),
            firefox: Some("78".to_string()),
            ios_saf: Some("12".to_string()),
            safari: Some("12".to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, v)| v.is_none())
    }

    /// `(browser, version)` pairs in a fixed order
    pub fn entries(&self) -> [(&'static str, Option<&str>); 8] {
        [
            ("android", self.android.as_deref()),
            ("chrome", self.chrome.as_deref()),
            ("edge", self.edge.as_deref()),
            ("firefox", self.firefox.as_deref()),
            ("ios_saf", self.ios_saf.as_deref()),
            ("opera", self.opera.as_deref()),
            ("safari", self.safari.as_deref()),
            ("samsung", self.samsung.as_deref()),
        ]
    }
}

/// Encode `major[.minor[.patch]]` the way browser target tables do:
/// `major << 16 | minor << 8 | patch`
pub fn parse_browser_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next().map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);
    let patch: u32 = parts.next().map(str::parse::<u32>).transpose().ok()?.unwrap_or(0);
    if parts.next().is_some() || major > 0xff || minor > 0xff || patch > 0xff {
        return None;
    }
    Some((major << 16) | (minor << 8) | patch)
}

impl BuildConfig {
    /// Load build configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse build configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: BuildConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the build configuration
    pub fn validate(&self) -> Result<()> {
        if self.esbuild.trim().is_empty() {
            anyhow::bail!("esbuild executable must not be empty");
        }
        if self.tailwindcss.trim().is_empty() {
            anyhow::bail!("tailwindcss executable must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if !(MIN_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&self.hash_length) {
            anyhow::bail!(
                "hash_length {} must be between {} and {}",
                self.hash_length,
                MIN_HASH_LENGTH,
                MAX_HASH_LENGTH
            );
        }
        for (browser, version) in self.targets.entries() {
            if let Some(version) = version {
                if parse_browser_version(version).is_none() {
                    anyhow::bail!("Invalid {} version in targets: '{}'", browser, version);
                }
            }
        }
        Ok(())
    }

    /// Browser targets, falling back to the built-in defaults
    pub fn effective_targets(&self) -> BrowserTargets {
        if self.targets.is_empty() {
            BrowserTargets::defaults()
        } else {
            self.targets.clone()
        }
    }
}
