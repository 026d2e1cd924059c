//! Pipeline specifications for the script and style builds

use crate::core::{error::BuildError, naming::NamingTemplate, params::BuildParameters};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Source extensions tried for the script entry, in order
pub const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs"];

pub const SCRIPTS_DIR: &str = "scripts";
pub const STYLES_DIR: &str = "styles";
const ENTRY_STEM: &str = "main";

/// Which of the two pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Scripts,
    Styles,
}

impl PipelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Scripts => SCRIPTS_DIR,
            PipelineKind::Styles => STYLES_DIR,
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named stage of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Remove stale artifacts from the output directory
    Clean,
    /// Run the style transform chain on the entry
    Transform,
    /// Hand the entry to the bundler engine
    Bundle,
    /// Hash, write and record every bundle output
    Emit,
    /// Persist the manifest
    Flush,
}

impl Stage {
    /// Whether the stage writes into the pipeline output directory
    pub fn writes_output(&self) -> bool {
        matches!(self, Stage::Emit | Stage::Flush)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Clean => "clean",
            Stage::Transform => "transform",
            Stage::Bundle => "bundle",
            Stage::Emit => "emit",
            Stage::Flush => "flush",
        };
        f.write_str(name)
    }
}

/// Where the entry point of a pipeline lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPoint {
    /// A fixed file
    File(PathBuf),
    /// `dir/stem.*`, resolved against `extensions` at bundle time
    Stem {
        dir: PathBuf,
        stem: String,
        extensions: Vec<String>,
    },
}

impl EntryPoint {
    /// Find the entry file on disk
    pub async fn resolve(&self) -> Result<PathBuf, BuildError> {
        match self {
            EntryPoint::File(path) => {
                if is_file(path).await {
                    Ok(path.clone())
                } else {
                    Err(BuildError::EntryNotFound(path.clone()))
                }
            }
            EntryPoint::Stem {
                dir,
                stem,
                extensions,
            } => {
                for ext in extensions {
                    let candidate = dir.join(format!("{}.{}", stem, ext));
                    if is_file(&candidate).await {
                        return Ok(candidate);
                    }
                }
                Err(BuildError::EntryNotFound(dir.join(format!("{}.*", stem))))
            }
        }
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

/// Everything needed to run one pipeline once
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    pub kind: PipelineKind,

    pub entry: EntryPoint,

    /// Root that `[dir]` in the naming template is relative to
    pub source_root: PathBuf,

    /// Directory receiving artifacts and the manifest
    pub output_dir: PathBuf,

    pub naming_template: NamingTemplate,

    /// Ordered stages; validated by the runner before execution
    pub stages: Vec<Stage>,

    /// Pattern, relative to `output_dir`, removed by the clean stage
    pub cleanup_glob: String,

    /// Style tool configuration root (styles only)
    pub config_root: Option<PathBuf>,
}

impl PipelineSpec {
    /// `{entry_root}/scripts/main.*` into `{output_root}/scripts/`
    pub fn scripts(params: &BuildParameters) -> Result<Self, BuildError> {
        Ok(Self {
            kind: PipelineKind::Scripts,
            entry: EntryPoint::Stem {
                dir: params.entry_root.join(SCRIPTS_DIR),
                stem: ENTRY_STEM.to_string(),
                extensions: SCRIPT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            },
            source_root: params.entry_root.clone(),
            output_dir: params.output_root.join(SCRIPTS_DIR),
            naming_template: NamingTemplate::parse("[name]-[hash]")?,
            stages: vec![Stage::Clean, Stage::Bundle, Stage::Emit, Stage::Flush],
            cleanup_glob: "*".to_string(),
            config_root: None,
        })
    }

    /// `{entry_root}/styles/main.css` into `{output_root}/styles/`
    pub fn styles(params: &BuildParameters) -> Result<Self, BuildError> {
        Ok(Self {
            kind: PipelineKind::Styles,
            entry: EntryPoint::File(
                params
                    .entry_root
                    .join(STYLES_DIR)
                    .join(format!("{}.css", ENTRY_STEM)),
            ),
            source_root: params.entry_root.clone(),
            output_dir: params.output_root.join(STYLES_DIR),
            naming_template: NamingTemplate::parse("[dir]/[name]-[hash]")?,
            stages: vec![
                Stage::Clean,
                Stage::Transform,
                Stage::Bundle,
                Stage::Emit,
                Stage::Flush,
            ],
            cleanup_glob: "*".to_string(),
            config_root: Some(params.config_root.clone()),
        })
    }

    pub fn for_kind(kind: PipelineKind, params: &BuildParameters) -> Result<Self, BuildError> {
        match kind {
            PipelineKind::Scripts => Self::scripts(params),
            PipelineKind::Styles => Self::styles(params),
        }
    }

    /// Check the ordering invariants of `stages`.
    ///
    /// Each stage appears at most once; clean is first; bundle needs a
    /// preceding transform only when one is listed; emit follows bundle;
    /// flush is present, last, and follows emit.
    pub fn validate_stages(&self) -> Result<(), BuildError> {
        let position = |stage: Stage| self.stages.iter().position(|s| *s == stage);

        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].contains(stage) {
                return Err(BuildError::StageOrder(format!("{} listed twice", stage)));
            }
        }

        if let Some(clean) = position(Stage::Clean) {
            if let Some(writer) = self.stages[..clean].iter().find(|s| s.writes_output()) {
                return Err(BuildError::StageOrder(format!(
                    "{} runs before clean",
                    writer
                )));
            }
        }
        if position(Stage::Clean) != Some(0) {
            return Err(BuildError::StageOrder("clean must be the first stage".to_string()));
        }

        let before = |first: Stage, second: Stage| -> Result<(), BuildError> {
            match (position(first), position(second)) {
                (Some(a), Some(b)) if a > b => Err(BuildError::StageOrder(format!(
                    "{} must run before {}",
                    first, second
                ))),
                (None, Some(_)) => Err(BuildError::StageOrder(format!(
                    "{} requires {}",
                    second, first
                ))),
                _ => Ok(()),
            }
        };
        if position(Stage::Transform).is_some() {
            before(Stage::Transform, Stage::Bundle)?;
        }
        before(Stage::Bundle, Stage::Emit)?;
        before(Stage::Emit, Stage::Flush)?;

        if position(Stage::Flush).map(|flush| flush + 1) != Some(self.stages.len()) {
            return Err(BuildError::StageOrder("flush must be the last stage".to_string()));
        }

        Ok(())
    }
}
