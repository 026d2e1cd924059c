//! Rewriting of source-map `sources` when a map changes location
//!
//! Bundlers write `sources` relative to their own output directory. Maps are
//! read with absolute sources and made relative again once the final
//! location of the map is known.

use serde_json::Value;
use std::path::{Component, Path, PathBuf};

/// Resolve every relative source of `map` against `dir`
pub fn absolutize_sources(map: &str, dir: &Path) -> Result<String, serde_json::Error> {
    rewrite_sources(map, |source| {
        let path = Path::new(source);
        if path.is_absolute() {
            return None;
        }
        Some(normalize(&dir.join(path)).to_string_lossy().into_owned())
    })
}

/// Make absolute sources relative to `map_dir`.
///
/// `renamed` maps a staged input back to the file it was generated from, so
/// the map points at the authored stylesheet rather than a scratch copy.
/// Relative sources are left as they are.
pub fn rebase_sources(
    map: &str,
    map_dir: &Path,
    renamed: Option<(&Path, &Path)>,
) -> Result<String, serde_json::Error> {
    let map_dir = normalize(map_dir);
    let renamed = renamed.map(|(staged, original)| (normalize(staged), normalize(original)));

    rewrite_sources(map, |source| {
        let path = Path::new(source);
        if !path.is_absolute() {
            return None;
        }
        let mut path = normalize(path);
        if let Some((staged, original)) = &renamed {
            if &path == staged {
                path = original.clone();
            }
        }
        Some(relative_path(&path, &map_dir))
    })
}

fn rewrite_sources<F>(map: &str, mut rewrite: F) -> Result<String, serde_json::Error>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut value: Value = serde_json::from_str(map)?;
    if let Some(sources) = value.get_mut("sources").and_then(Value::as_array_mut) {
        for source in sources.iter_mut() {
            let rewritten = source.as_str().and_then(&mut rewrite);
            if let Some(rewritten) = rewritten {
                *source = Value::String(rewritten);
            }
        }
    }
    serde_json::to_string(&value)
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// `target` relative to `base`, with `/` separators
fn relative_path(target: &Path, base: &Path) -> String {
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();
    let common = target
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_string(); base.len() - common];
    parts.extend(
        target[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}
