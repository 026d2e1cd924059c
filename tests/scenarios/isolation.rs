//! Test: Isolation - one pipeline failing never affects the other

use crate::helpers::*;
use assetter::core::{BuildError, BuildResult};
use assetter::engine::EngineError;
use assetter::execution::SchedulingStrategy;

#[tokio::test]
async fn test_broken_config_root_fails_only_styles() {
    for strategy in [SchedulingStrategy::Sequential, SchedulingStrategy::Concurrent] {
        let fixture = Fixture::without_style_config();

        let (report, markers) = build(&fixture, strategy).await;

        assert_eq!(markers, vec!["<scripts:success>", "<styles:fail>"]);
        assert!(matches!(
            report.styles,
            BuildResult::Failure(BuildError::Engine(EngineError::ConfigNotFound(_)))
        ));
        assert_eq!(report.exit_code(), 1);
    }
}

#[tokio::test]
async fn test_failed_styles_leave_script_artifacts_intact() {
    let fixture = Fixture::without_style_config();

    let (report, _) = build(&fixture, SchedulingStrategy::Concurrent).await;

    assert!(report.scripts.is_success());
    let manifest = fixture.manifest("scripts");
    for (_, path) in manifest.iter() {
        assert!(std::path::Path::new(path).is_file(), "{} missing", path);
    }
    assert!(!fixture.output_dir("styles").join("manifest.json").exists());
}

#[tokio::test]
async fn test_missing_script_entry_fails_only_scripts() {
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.params.entry_root.join("scripts/main.ts")).unwrap();

    let (report, markers) = build(&fixture, SchedulingStrategy::Sequential).await;

    assert_eq!(markers, vec!["<scripts:fail>", "<styles:success>"]);
    assert!(matches!(
        report.scripts,
        BuildResult::Failure(BuildError::EntryNotFound(_))
    ));
    assert!(fixture.manifest("styles").get("styles/main.css").is_some());
}

#[tokio::test]
async fn test_engine_failure_is_reported_per_pipeline() {
    let fixture = Fixture::new();
    let (runner, markers) = runner_with(FailingBundler, SchedulingStrategy::Concurrent);

    let report = runner.run(&fixture.params).await;

    let mut markers = markers.lock().unwrap().clone();
    markers.sort();
    assert_eq!(markers, vec!["<scripts:fail>", "<styles:fail>"]);
    let error = report.scripts.error().unwrap().to_string();
    assert!(error.contains("unexpected end of file"), "{}", error);
}

#[tokio::test]
async fn test_panicking_engine_fails_only_its_pipeline() {
    for strategy in [SchedulingStrategy::Sequential, SchedulingStrategy::Concurrent] {
        let fixture = Fixture::new();
        let (runner, markers) = runner_with(PanickingBundler, strategy);

        let report = runner.run(&fixture.params).await;

        let mut markers = markers.lock().unwrap().clone();
        markers.sort();
        assert_eq!(markers, vec!["<scripts:fail>", "<styles:success>"]);
        assert!(matches!(report.scripts, BuildResult::Failure(BuildError::Panicked(_))));
        let error = report.scripts.error().unwrap().to_string();
        assert!(error.contains("plugin crashed"), "{}", error);

        let styles = fixture.manifest("styles");
        let css = styles.get("styles/main.css").unwrap();
        assert!(std::path::Path::new(css).is_file());
        assert!(!fixture.output_dir("scripts").join("manifest.json").exists());
        assert_eq!(report.exit_code(), 1);
    }
}
