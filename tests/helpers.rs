//! Test utility functions for assetter

#![allow(dead_code)]

use assetter::cli::output::marker;
use assetter::core::config::BuildConfig;
use assetter::core::{BuildParameters, Manifest, RunReport};
use assetter::engine::{BundleOutput, BundleRequest, Bundler, EngineError, UtilityGenerator};
use assetter::execution::{ExecutionEvent, PipelineRunner, SchedulingStrategy};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Bundler that copies the entry through, renaming `.ts` style sources to
/// `.js`, and emits a small source map linked from the output
#[derive(Default, Clone)]
pub struct CopyBundler {
    calls: Arc<AtomicUsize>,
}

impl CopyBundler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bundler for CopyBundler {
    async fn bundle(&self, request: &BundleRequest) -> Result<Vec<BundleOutput>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let source = tokio::fs::read_to_string(&request.entry)
            .await
            .map_err(|e| EngineError::io(&request.entry, e))?;
        let name = request
            .entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = match request.entry.extension().and_then(|e| e.to_str()) {
            Some("css") => "css",
            _ => "js",
        };

        let link = if extension == "css" {
            format!("/*# sourceMappingURL={}.{}.map */", name, extension)
        } else {
            format!("//# sourceMappingURL={}.{}.map", name, extension)
        };
        let source_map = serde_json::json!({
            "version": 3,
            "sources": [request.entry.to_string_lossy()],
            "mappings": "",
        });

        Ok(vec![BundleOutput {
            name,
            extension: extension.to_string(),
            contents: format!("{}\n{}\n", source.trim_end(), link),
            source_map: Some(source_map.to_string()),
        }])
    }
}

/// Bundler that always fails, as a crashed engine would
pub struct FailingBundler;

#[async_trait]
impl Bundler for FailingBundler {
    async fn bundle(&self, _request: &BundleRequest) -> Result<Vec<BundleOutput>, EngineError> {
        Err(EngineError::Failed {
            engine: "esbuild".to_string(),
            code: 1,
            stderr: "unexpected end of file".to_string(),
        })
    }
}

/// Bundler that panics on script entries and copies stylesheets, as a
/// misbehaving plugin would
pub struct PanickingBundler;

#[async_trait]
impl Bundler for PanickingBundler {
    async fn bundle(&self, request: &BundleRequest) -> Result<Vec<BundleOutput>, EngineError> {
        if request.entry.extension().is_some_and(|e| e == "css") {
            return CopyBundler::new().bundle(request).await;
        }
        panic!("plugin crashed while bundling {}", request.entry.display());
    }
}

/// Utility generator that returns the authored stylesheet unchanged
pub struct PassthroughGenerator;

#[async_trait]
impl UtilityGenerator for PassthroughGenerator {
    async fn generate(&self, input: &Path, _config: &Path) -> Result<String, EngineError> {
        tokio::fs::read_to_string(input)
            .await
            .map_err(|e| EngineError::io(input, e))
    }
}

/// A throwaway project: `web/` sources, `config/` and an empty `public/`
pub struct Fixture {
    pub dir: TempDir,
    pub params: BuildParameters,
}

impl Fixture {
    /// `export const x = 1`, `.a{color:red}` and a minimal style config
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path();
        let params = BuildParameters::new(root.join("web"), root.join("config"), root.join("public"))
            .expect("valid parameters");

        let fixture = Self { dir, params };
        fixture.write_script("main.ts", "export const x = 1");
        fixture.write_style(".a{color:red}");
        fixture.write_config();
        fixture
    }

    /// Same sources, but no style config under the config root
    pub fn without_style_config() -> Self {
        let fixture = Self::new();
        std::fs::remove_file(fixture.params.config_root.join("tailwind.config.js"))
            .expect("remove config");
        fixture
    }

    pub fn write_script(&self, file: &str, contents: &str) {
        let dir = self.params.entry_root.join("scripts");
        std::fs::create_dir_all(&dir).expect("scripts dir");
        std::fs::write(dir.join(file), contents).expect("write script");
    }

    pub fn write_style(&self, contents: &str) {
        let dir = self.params.entry_root.join("styles");
        std::fs::create_dir_all(&dir).expect("styles dir");
        std::fs::write(dir.join("main.css"), contents).expect("write style");
    }

    pub fn write_config(&self) {
        std::fs::create_dir_all(&self.params.config_root).expect("config dir");
        std::fs::write(
            self.params.config_root.join("tailwind.config.js"),
            "module.exports = { content: [] }",
        )
        .expect("write config");
    }

    pub fn output_dir(&self, pipeline: &str) -> PathBuf {
        self.params.output_root.join(pipeline)
    }

    pub fn manifest(&self, pipeline: &str) -> Manifest {
        Manifest::read(&self.output_dir(pipeline).join("manifest.json")).expect("manifest")
    }

    /// Every file under a pipeline output directory, relative to it
    pub fn files(&self, pipeline: &str) -> Vec<String> {
        let base = self.output_dir(pipeline);
        let mut files = Vec::new();
        collect_files(&base, &base, &mut files);
        files.sort();
        files
    }
}

fn collect_files(base: &Path, dir: &Path, files: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(base, &path, files);
        } else if let Ok(relative) = path.strip_prefix(base) {
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
}

/// Pipeline outcome lines, as the CLI prints them
pub type Markers = Arc<Mutex<Vec<String>>>;

/// Runner over the given bundler with a pass-through generator, recording
/// `<kind:outcome>` markers
pub fn runner_with<B: Bundler + 'static>(
    bundler: B,
    strategy: SchedulingStrategy,
) -> (PipelineRunner<B, PassthroughGenerator>, Markers) {
    let mut runner = PipelineRunner::new(bundler, PassthroughGenerator, &BuildConfig::default())
        .with_strategy(strategy);

    let markers: Markers = Arc::new(Mutex::new(Vec::new()));
    let sink = markers.clone();
    runner.add_event_handler(move |event| match event {
        ExecutionEvent::PipelineSucceeded { kind, .. } => sink.lock().unwrap().push(marker(kind, true)),
        ExecutionEvent::PipelineFailed { kind, .. } => sink.lock().unwrap().push(marker(kind, false)),
        _ => {}
    });
    (runner, markers)
}

/// Build the fixture once with the copying bundler
pub async fn build(fixture: &Fixture, strategy: SchedulingStrategy) -> (RunReport, Vec<String>) {
    let (runner, markers) = runner_with(CopyBundler::new(), strategy);
    let report = runner.run(&fixture.params).await;
    let mut markers = markers.lock().unwrap().clone();
    markers.sort();
    (report, markers)
}
