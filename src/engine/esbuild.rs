//! esbuild CLI client - bundles, minifies and source-maps one entry

use crate::core::source_map::absolutize_sources;
use crate::engine::{BundleOutput, BundleRequest, Bundler, EngineCommand, EngineError, OutputFormat};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use tracing::{debug, info};

/// Bundler backed by the `esbuild` executable.
///
/// esbuild writes unhashed outputs into a scratch directory; naming and
/// placement in the real output directory is left to the pipeline.
#[derive(Debug, Clone)]
pub struct EsbuildClient {
    command: EngineCommand,
}

impl EsbuildClient {
    pub fn new(command: EngineCommand) -> Self {
        Self { command }
    }

    fn arguments(request: &BundleRequest, outdir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![request.entry.clone().into_os_string(), "--bundle".into()];
        if request.minify {
            args.push("--minify".into());
        }
        if request.sourcemap {
            args.push("--sourcemap".into());
        }
        if let Some(OutputFormat::Esm) = request.format {
            args.push("--format=esm".into());
        }
        let mut outdir_arg = OsString::from("--outdir=");
        outdir_arg.push(outdir.as_os_str());
        args.push(outdir_arg);
        args.push("--entry-names=[name]".into());
        args.push("--log-level=error".into());
        args
    }
}

#[async_trait]
impl Bundler for EsbuildClient {
    async fn bundle(&self, request: &BundleRequest) -> Result<Vec<BundleOutput>, EngineError> {
        info!("Bundling {} with {}", request.entry.display(), self.command.program());

        let outdir = tempfile::Builder::new()
            .prefix("assetter-esbuild-")
            .tempdir()
            .map_err(|e| EngineError::io(std::env::temp_dir(), e))?;

        self.command
            .run(&Self::arguments(request, outdir.path()))
            .await?;

        let outputs = collect_outputs(outdir.path()).await?;
        if outputs.is_empty() {
            return Err(EngineError::Output(format!(
                "{} produced no files for {}",
                self.command.program(),
                request.entry.display()
            )));
        }
        debug!("esbuild produced {} output(s)", outputs.len());
        Ok(outputs)
    }
}

/// Read every non-map file of `dir`, pairing it with `<file>.map`.
///
/// Map sources come back as absolute paths.
pub async fn collect_outputs(dir: &Path) -> Result<Vec<BundleOutput>, EngineError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| EngineError::io(dir, e))?;

    let mut outputs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| EngineError::io(dir, e))? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map_err(|e| EngineError::io(&path, e))?
            .is_file();
        if !is_file || path.extension().is_some_and(|ext| ext == "map") {
            continue;
        }

        let (Some(name), Some(extension)) = (
            path.file_stem().map(|s| s.to_string_lossy().into_owned()),
            path.extension().map(|s| s.to_string_lossy().into_owned()),
        ) else {
            continue;
        };

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| EngineError::io(&path, e))?;

        let mut map_path = path.clone().into_os_string();
        map_path.push(".map");
        let source_map = match tokio::fs::read_to_string(&map_path).await {
            // Sources are relative to `dir`, which is about to disappear
            Ok(map) => Some(absolutize_sources(&map, dir).map_err(|e| {
                EngineError::Output(format!("invalid source map {:?}: {}", map_path, e))
            })?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(EngineError::io(map_path, e)),
        };

        outputs.push(BundleOutput {
            name,
            extension,
            contents,
            source_map,
        });
    }

    outputs.sort_by(|a, b| (&a.name, &a.extension).cmp(&(&b.name, &b.extension)));
    Ok(outputs)
}
