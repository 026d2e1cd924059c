//! Content-hash naming of output artifacts
//!
//! Templates use esbuild-style placeholders: `[name]`, `[dir]` and `[hash]`.
//! The hash is SHA-256 over the artifact content, hex encoded and truncated.

use crate::core::error::BuildError;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

pub const MIN_HASH_LENGTH: usize = 8;
pub const MAX_HASH_LENGTH: usize = 64;
pub const DEFAULT_HASH_LENGTH: usize = 16;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Za-z]+)\]").expect("placeholder regex"));

static SOURCE_MAP_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n?(?://# sourceMappingURL=\S+|/\*# sourceMappingURL=\S+ \*/)\s*$")
        .expect("source map link regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Name,
    Dir,
    Hash,
}

/// A parsed naming template such as `[dir]/[name]-[hash]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl NamingTemplate {
    /// Parse a template; it must contain `[name]` and `[hash]`
    pub fn parse(raw: &str) -> Result<Self, BuildError> {
        let invalid = |reason: &str| BuildError::InvalidTemplate {
            template: raw.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(raw) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                segments.push(Segment::Literal(raw[last..whole.start()].to_string()));
            }
            segments.push(match &caps[1] {
                "name" => Segment::Name,
                "dir" => Segment::Dir,
                "hash" => Segment::Hash,
                other => return Err(invalid(&format!("unknown placeholder [{}]", other))),
            });
            last = whole.end();
        }
        if last < raw.len() {
            segments.push(Segment::Literal(raw[last..].to_string()));
        }

        if !segments.contains(&Segment::Name) {
            return Err(invalid("missing [name]"));
        }
        if !segments.contains(&Segment::Hash) {
            return Err(invalid("missing [hash]"));
        }
        if raw.contains("..") {
            return Err(invalid("must not contain '..'"));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether outputs keep the directory of their entry
    pub fn uses_dir(&self) -> bool {
        self.segments.contains(&Segment::Dir)
    }

    /// Render the template into a relative path (without extension).
    ///
    /// An empty `dir` collapses, so `[dir]/[name]` renders as `name`.
    pub fn render(&self, name: &str, dir: &Path, hash: &str) -> PathBuf {
        let dir = dir.to_string_lossy().replace('\\', "/");
        let mut rendered = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Name => rendered.push_str(name),
                Segment::Dir => rendered.push_str(&dir),
                Segment::Hash => rendered.push_str(hash),
            }
        }
        normalize(&rendered)
    }
}

fn normalize(rendered: &str) -> PathBuf {
    Path::new(rendered)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

/// Hex SHA-256 of `content`, truncated to `length` characters
pub fn content_hash(content: &[u8], length: usize) -> String {
    let digest = Sha256::digest(content);
    let encoded = hex::encode(digest);
    encoded[..length.clamp(MIN_HASH_LENGTH, MAX_HASH_LENGTH)].to_string()
}

/// The name an artifact had before hashing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetName {
    /// File stem, e.g. `main`
    pub name: String,
    /// Directory relative to the entry root, e.g. `styles`
    pub dir: PathBuf,
    /// Extension without the dot, e.g. `js`
    pub extension: String,
}

/// Result of naming one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedName {
    /// Key recorded in the manifest, e.g. `main.js`
    pub logical: String,
    /// Path relative to the pipeline output directory
    pub path: PathBuf,
    pub hash: String,
}

/// Derives cache-busting output names from content
#[derive(Debug, Clone)]
pub struct ContentHashNamer {
    template: NamingTemplate,
    hash_length: usize,
}

impl ContentHashNamer {
    pub fn new(template: NamingTemplate, hash_length: usize) -> Result<Self, BuildError> {
        if !(MIN_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&hash_length) {
            return Err(BuildError::InvalidTemplate {
                template: template.raw.clone(),
                reason: format!(
                    "hash length {} outside {}..={}",
                    hash_length, MIN_HASH_LENGTH, MAX_HASH_LENGTH
                ),
            });
        }
        Ok(Self {
            template,
            hash_length,
        })
    }

    pub fn template(&self) -> &NamingTemplate {
        &self.template
    }

    /// Manifest key for an asset: its pre-hash relative path
    pub fn logical_name(&self, asset: &AssetName) -> String {
        let file = format!("{}.{}", asset.name, asset.extension);
        if self.template.uses_dir() && !asset.dir.as_os_str().is_empty() {
            let dir = asset.dir.to_string_lossy().replace('\\', "/");
            format!("{}/{}", dir.trim_end_matches('/'), file)
        } else {
            file
        }
    }

    /// Name an artifact from its final content
    pub fn name(&self, asset: &AssetName, content: &[u8]) -> HashedName {
        let hash = content_hash(content, self.hash_length);
        let stem = self.template.render(&asset.name, &asset.dir, &hash);
        let file_name = match stem.file_name() {
            Some(file) => format!("{}.{}", file.to_string_lossy(), asset.extension),
            None => format!("{}.{}", hash, asset.extension),
        };
        HashedName {
            logical: self.logical_name(asset),
            path: stem.with_file_name(file_name),
            hash,
        }
    }
}

/// Split off a trailing `sourceMappingURL` comment
pub fn strip_source_map_link(content: &str) -> &str {
    match SOURCE_MAP_LINK.find(content) {
        Some(found) => &content[..found.start()],
        None => content,
    }
}

/// Append a `sourceMappingURL` comment in the syntax of the artifact
pub fn append_source_map_link(body: &str, extension: &str, map_file: &str) -> String {
    if extension == "css" {
        format!("{}\n/*# sourceMappingURL={} */\n", body, map_file)
    } else {
        format!("{}\n//# sourceMappingURL={}\n", body, map_file)
    }
}
