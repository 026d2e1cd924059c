//! Test: Cleanup - stale artifacts never survive a rebuild

use crate::helpers::*;
use assetter::execution::SchedulingStrategy;

#[tokio::test]
async fn test_second_run_leaves_only_its_own_artifacts() {
    let fixture = Fixture::new();
    build(&fixture, SchedulingStrategy::Sequential).await;
    let first_js = fixture.manifest("scripts").get("main.js").unwrap().to_string();
    let first_css = fixture
        .manifest("styles")
        .get("styles/main.css")
        .unwrap()
        .to_string();

    fixture.write_script("main.ts", "export const x = 2");
    fixture.write_style(".a{color:blue}");
    let (report, _) = build(&fixture, SchedulingStrategy::Sequential).await;
    assert_eq!(report.exit_code(), 0);

    let second_js = fixture.manifest("scripts").get("main.js").unwrap().to_string();
    let second_css = fixture
        .manifest("styles")
        .get("styles/main.css")
        .unwrap()
        .to_string();
    assert_ne!(first_js, second_js);
    assert_ne!(first_css, second_css);

    assert!(!std::path::Path::new(&first_js).exists());
    assert!(!std::path::Path::new(&first_css).exists());
    assert_eq!(fixture.files("scripts").len(), 3);
    assert_eq!(fixture.files("styles").len(), 3);
}

#[tokio::test]
async fn test_unrelated_files_in_output_dir_are_removed() {
    let fixture = Fixture::new();
    let scripts = fixture.output_dir("scripts");
    std::fs::create_dir_all(scripts.join("legacy/chunks")).unwrap();
    std::fs::write(scripts.join("legacy/chunks/old.js"), "old").unwrap();
    std::fs::write(scripts.join("app-deadbeef.js"), "old").unwrap();

    build(&fixture, SchedulingStrategy::Sequential).await;

    assert!(!scripts.join("legacy").exists());
    assert!(!scripts.join("app-deadbeef.js").exists());
}

#[tokio::test]
async fn test_siblings_of_output_root_are_untouched() {
    let fixture = Fixture::new();
    let keep = fixture.params.output_root.join("index.html");
    std::fs::create_dir_all(&fixture.params.output_root).unwrap();
    std::fs::write(&keep, "<html></html>").unwrap();

    build(&fixture, SchedulingStrategy::Concurrent).await;

    assert_eq!(std::fs::read_to_string(&keep).unwrap(), "<html></html>");
}

#[tokio::test]
async fn test_failed_bundle_still_cleans_first() {
    let fixture = Fixture::new();
    build(&fixture, SchedulingStrategy::Sequential).await;

    let (runner, markers) = runner_with(FailingBundler, SchedulingStrategy::Sequential);
    let report = runner.run(&fixture.params).await;

    assert_eq!(report.exit_code(), 1);
    assert_eq!(markers.lock().unwrap().len(), 2);
    // Clean ran before the bundler failed, and nothing was written after it
    assert!(fixture.files("scripts").is_empty());
    assert!(fixture.files("styles").is_empty());
}
