//! Test: Determinism - names follow content and nothing else

use crate::helpers::*;
use assetter::execution::SchedulingStrategy;
use std::path::Path;

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

#[tokio::test]
async fn test_identical_content_gives_identical_names() {
    let first = Fixture::new();
    let second = Fixture::new();

    build(&first, SchedulingStrategy::Sequential).await;
    build(&second, SchedulingStrategy::Concurrent).await;

    assert_eq!(
        file_name(first.manifest("scripts").get("main.js").unwrap()),
        file_name(second.manifest("scripts").get("main.js").unwrap())
    );
    assert_eq!(
        file_name(first.manifest("styles").get("styles/main.css").unwrap()),
        file_name(second.manifest("styles").get("styles/main.css").unwrap())
    );
}

#[tokio::test]
async fn test_rebuild_without_changes_is_stable() {
    let fixture = Fixture::new();

    build(&fixture, SchedulingStrategy::Sequential).await;
    let before = fixture.files("scripts");
    build(&fixture, SchedulingStrategy::Sequential).await;

    assert_eq!(before, fixture.files("scripts"));
}

#[tokio::test]
async fn test_one_byte_change_gives_new_name() {
    let fixture = Fixture::new();
    build(&fixture, SchedulingStrategy::Sequential).await;
    let before = file_name(fixture.manifest("scripts").get("main.js").unwrap());

    fixture.write_script("main.ts", "export const x = 2");
    build(&fixture, SchedulingStrategy::Sequential).await;
    let after = file_name(fixture.manifest("scripts").get("main.js").unwrap());

    assert_ne!(before, after);
    assert!(after.starts_with("main-"));
}
