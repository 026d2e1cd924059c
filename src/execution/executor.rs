//! Stage executor - runs individual pipeline stages against a context

use crate::{
    core::{
        clean::clean,
        naming::{append_source_map_link, strip_source_map_link},
        source_map::rebase_sources,
        AssetName, BuildError, ContentHashNamer, EntryPoint, PipelineContext, PipelineKind,
        PipelineSpec, Stage,
    },
    engine::{BundleOutput, BundleRequest, Bundler, OutputFormat, StyleTransformChain, UtilityGenerator},
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Executes single stages of a pipeline
pub struct StageExecutor<B, G> {
    bundler: B,
    styles: StyleTransformChain<G>,
    hash_length: usize,
}

impl<B: Bundler, G: UtilityGenerator> StageExecutor<B, G> {
    pub fn new(bundler: B, styles: StyleTransformChain<G>, hash_length: usize) -> Self {
        Self {
            bundler,
            styles,
            hash_length,
        }
    }

    /// Execute one stage, leaving its results in `ctx`
    pub async fn execute(
        &self,
        spec: &PipelineSpec,
        stage: Stage,
        ctx: &mut PipelineContext,
    ) -> Result<(), BuildError> {
        debug!("Running {} stage of {}", stage, spec.kind);
        match stage {
            Stage::Clean => self.clean(spec, ctx).await,
            Stage::Transform => self.transform(spec, ctx).await,
            Stage::Bundle => self.bundle(spec, ctx).await,
            Stage::Emit => self.emit(spec, ctx).await,
            Stage::Flush => self.flush(spec, ctx).await,
        }
    }

    async fn clean(&self, spec: &PipelineSpec, ctx: &mut PipelineContext) -> Result<(), BuildError> {
        ctx.removed = clean(&spec.cleanup_glob, &spec.output_dir).await?;
        if !ctx.removed.is_empty() {
            info!(
                "Removed {} stale output(s) from {}",
                ctx.removed.len(),
                spec.output_dir.display()
            );
        }
        Ok(())
    }

    async fn transform(&self, spec: &PipelineSpec, ctx: &mut PipelineContext) -> Result<(), BuildError> {
        let entry = spec.entry.resolve().await?;
        let config_root = spec
            .config_root
            .as_deref()
            .ok_or(BuildError::MissingInput {
                stage: Stage::Transform,
            })?;

        let css = self.styles.transform(&entry, config_root).await?;

        // Keep the entry's file name so the bundler names its output the same
        let file_name = entry.file_name().ok_or_else(|| BuildError::EntryNotFound(entry.clone()))?;
        let staging = ctx
            .staging_dir()
            .map_err(|e| BuildError::io(std::env::temp_dir(), e))?;
        let staged = staging.join(file_name);
        tokio::fs::write(&staged, css)
            .await
            .map_err(|e| BuildError::io(&staged, e))?;

        debug!("Staged transformed stylesheet at {}", staged.display());
        ctx.entry = Some(staged);
        Ok(())
    }

    async fn bundle(&self, spec: &PipelineSpec, ctx: &mut PipelineContext) -> Result<(), BuildError> {
        let entry = match &ctx.entry {
            Some(entry) => entry.clone(),
            None => spec.entry.resolve().await?,
        };

        let mut request = BundleRequest::new(entry);
        if spec.kind == PipelineKind::Scripts {
            request = request.with_format(OutputFormat::Esm);
        }

        ctx.outputs = self.bundler.bundle(&request).await?;
        info!("Bundled {} output(s) for {}", ctx.outputs.len(), spec.kind);
        Ok(())
    }

    async fn emit(&self, spec: &PipelineSpec, ctx: &mut PipelineContext) -> Result<(), BuildError> {
        if !ctx.has_completed(Stage::Bundle) {
            return Err(BuildError::MissingInput { stage: Stage::Emit });
        }

        let namer = ContentHashNamer::new(spec.naming_template.clone(), self.hash_length)?;
        let dir = entry_dir(spec);
        let outputs = std::mem::take(&mut ctx.outputs);

        // A staged entry is mapped back to the authored file
        let original = match &ctx.entry {
            Some(_) => Some(spec.entry.resolve().await?),
            None => None,
        };
        let renamed = ctx.entry.as_deref().zip(original.as_deref());

        for output in &outputs {
            let written = write_output(&namer, &spec.output_dir, &dir, output, renamed).await?;
            if ctx.recorder.manifest().get(&written.logical).is_some() {
                return Err(BuildError::DuplicateAsset(written.logical));
            }
            ctx.recorder.record(written.logical, written.path.to_string_lossy());
            ctx.artifacts.push(written.path);
            ctx.artifacts.extend(written.source_map);
        }
        Ok(())
    }

    async fn flush(&self, spec: &PipelineSpec, ctx: &mut PipelineContext) -> Result<(), BuildError> {
        if !ctx.has_completed(Stage::Emit) {
            return Err(BuildError::MissingInput { stage: Stage::Flush });
        }
        ctx.manifest_path = Some(ctx.recorder.flush(&spec.output_dir).await?);
        Ok(())
    }
}

/// Directory of the entry relative to the source root, used for `[dir]`
fn entry_dir(spec: &PipelineSpec) -> PathBuf {
    let dir = match &spec.entry {
        EntryPoint::File(path) => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        EntryPoint::Stem { dir, .. } => dir.clone(),
    };
    dir.strip_prefix(&spec.source_root)
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Files written for one bundle output
#[derive(Debug)]
struct WrittenOutput {
    /// Manifest key, e.g. `main.js`
    logical: String,
    path: PathBuf,
    /// Linked from `path`, never recorded in the manifest
    source_map: Option<PathBuf>,
}

/// Hash and write one bundle output (and its source map)
async fn write_output(
    namer: &ContentHashNamer,
    output_dir: &Path,
    dir: &Path,
    output: &BundleOutput,
    renamed: Option<(&Path, &Path)>,
) -> Result<WrittenOutput, BuildError> {
    let asset = AssetName {
        name: output.name.clone(),
        dir: dir.to_path_buf(),
        extension: output.extension.clone(),
    };
    let body = strip_source_map_link(&output.contents);
    let named = namer.name(&asset, body.as_bytes());

    let target = output_dir.join(&named.path);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| BuildError::io(parent, e))?;
    }

    let mut source_map = None;
    let contents = match &output.source_map {
        Some(map) => {
            let mut map_target = target.clone().into_os_string();
            map_target.push(".map");
            let map_target = PathBuf::from(map_target);
            let map_file = map_target
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let map_dir = map_target.parent().unwrap_or(output_dir);
            let map_dir = std::path::absolute(map_dir).map_err(|e| BuildError::io(map_dir, e))?;
            let map = rebase_sources(map, &map_dir, renamed).map_err(BuildError::SourceMap)?;
            tokio::fs::write(&map_target, map)
                .await
                .map_err(|e| BuildError::io(&map_target, e))?;
            source_map = Some(map_target);

            append_source_map_link(body, &output.extension, &map_file)
        }
        None => body.to_string(),
    };

    tokio::fs::write(&target, contents)
        .await
        .map_err(|e| BuildError::io(&target, e))?;
    debug!("Wrote {} as {}", named.logical, target.display());

    Ok(WrittenOutput {
        logical: named.logical,
        path: target,
        source_map,
    })
}
