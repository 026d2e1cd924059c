//! Test: End to end - a fresh project builds into hashed bundles

use crate::helpers::*;
use assetter::execution::SchedulingStrategy;
use std::path::Path;

fn is_hashed(file: &str, prefix: &str, extension: &str) -> bool {
    let Some(hash) = file
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(extension))
    else {
        return false;
    };
    hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

#[tokio::test]
async fn test_fresh_build_produces_hashed_bundles() {
    let fixture = Fixture::new();

    let (report, markers) = build(&fixture, SchedulingStrategy::Sequential).await;

    assert_eq!(markers, vec!["<scripts:success>", "<styles:success>"]);
    assert_eq!(report.exit_code(), 0);

    let scripts = fixture.files("scripts");
    assert_eq!(scripts.len(), 3, "{:?}", scripts);
    assert!(scripts.contains(&"manifest.json".to_string()));
    let js = scripts
        .iter()
        .find(|f| f.ends_with(".js"))
        .expect("hashed script");
    assert!(is_hashed(js, "main-", ".js"), "{}", js);
    assert!(scripts.contains(&format!("{}.map", js)));

    let styles = fixture.files("styles");
    assert_eq!(styles.len(), 3, "{:?}", styles);
    let css = styles
        .iter()
        .find(|f| f.ends_with(".css"))
        .expect("hashed stylesheet");
    assert!(is_hashed(css, "styles/main-", ".css"), "{}", css);
    assert!(styles.contains(&format!("{}.map", css)));
}

#[tokio::test]
async fn test_manifests_resolve_to_built_files() {
    let fixture = Fixture::new();
    build(&fixture, SchedulingStrategy::Concurrent).await;

    let scripts = fixture.manifest("scripts");
    let js = scripts.get("main.js").expect("main.js entry");
    assert!(js.starts_with(&*fixture.output_dir("scripts").to_string_lossy()));
    let content = std::fs::read_to_string(js).unwrap();
    assert!(content.starts_with("export const x = 1"));

    let styles = fixture.manifest("styles");
    let css = styles.get("styles/main.css").expect("styles/main.css entry");
    let content = std::fs::read_to_string(css).unwrap();
    assert!(content.contains(".a"));
    assert!(content.contains("red"));
}

#[tokio::test]
async fn test_artifacts_link_their_hashed_maps() {
    let fixture = Fixture::new();
    build(&fixture, SchedulingStrategy::Sequential).await;

    let manifest = fixture.manifest("scripts");
    let js = Path::new(manifest.get("main.js").unwrap());
    let map_name = format!("{}.map", js.file_name().unwrap().to_string_lossy());

    let content = std::fs::read_to_string(js).unwrap();
    assert!(content.trim_end().ends_with(&format!("//# sourceMappingURL={}", map_name)));

    let styles = fixture.manifest("styles");
    let css = Path::new(styles.get("styles/main.css").unwrap());
    let content = std::fs::read_to_string(css).unwrap();
    assert!(content.contains("/*# sourceMappingURL=main-"));
}

#[tokio::test]
async fn test_script_entry_falls_back_to_other_extensions() {
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.params.entry_root.join("scripts/main.ts")).unwrap();
    fixture.write_script("main.jsx", "export const y = 2");

    let (report, _) = build(&fixture, SchedulingStrategy::Sequential).await;

    assert!(report.scripts.is_success(), "{:?}", report.scripts.error());
    assert!(fixture.manifest("scripts").get("main.js").is_some());
}
