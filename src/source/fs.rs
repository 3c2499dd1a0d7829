//! Filesystem vault - a directory tree of Markdown notes
//!
//! Listing walks the tree with `walkdir` on the blocking pool; headings are
//! read per file with `tokio::fs`. Hidden entries (`.obsidian/`, `.git/`,
//! `.trash/`) are skipped unless asked for.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use super::{watch_vault, DocumentRecord, DocumentSource, SourceError, Subscription};
use crate::config::VaultConfig;

/// A vault rooted at a directory
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    extensions: Vec<String>,
    include_hidden: bool,
}

impl FsVault {
    /// Vault of `.md` files under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec!["md".to_string()],
            include_hidden: false,
        }
    }

    pub fn from_config(config: &VaultConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            extensions: config.extensions.clone(),
            include_hidden: config.include_hidden,
        }
    }

    /// Builder: file extensions to list (without the dot)
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Builder: also list files under hidden directories
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Same vault with its root made absolute and symlink-free
    ///
    /// Watcher events carry absolute paths, so a relative root such as `.`
    /// must be resolved before they can be matched. A root that can't be
    /// resolved is kept as given.
    pub(crate) fn resolved(mut self) -> Self {
        if let Ok(root) = std::fs::canonicalize(&self.root) {
            self.root = root;
        }
        self
    }

    /// Whether a file at `path` belongs in the vault listing
    pub(crate) fn accepts(&self, path: &Path) -> bool {
        let extension_ok = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);

        extension_ok && self.is_visible(path)
    }

    /// Whether `path` lies under the root and outside hidden directories
    pub(crate) fn is_visible(&self, path: &Path) -> bool {
        match path.strip_prefix(&self.root) {
            Ok(relative) => {
                self.include_hidden
                    || !relative
                        .components()
                        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
            }
            Err(_) => false,
        }
    }

    /// Vault-relative, `/`-separated record for an absolute path
    pub(crate) fn record_for(&self, path: &Path) -> Option<DocumentRecord> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            return None;
        }

        let name = relative.file_stem()?.to_string_lossy().into_owned();
        Some(DocumentRecord::new(name, parts.join("/")))
    }

    fn walk(&self) -> Vec<DocumentRecord> {
        let include_hidden = self.include_hidden;

        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| include_hidden || !is_hidden(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable vault entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.accepts(entry.path()))
            .filter_map(|entry| self.record_for(entry.path()))
            .collect()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

#[async_trait]
impl DocumentSource for FsVault {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::RootNotFound(self.root.clone()));
        }

        let vault = self.clone();
        let documents = tokio::task::spawn_blocking(move || vault.walk()).await?;

        tracing::debug!(root = ?self.root, documents = documents.len(), "Listed vault documents");
        Ok(documents)
    }

    fn supports_headings(&self) -> bool {
        true
    }

    async fn headings(&self, document: &DocumentRecord) -> Result<Vec<String>, SourceError> {
        let path = self.root.join(&document.path);
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(extract_headings(&content))
    }

    fn subscribe(&self) -> Result<Subscription, SourceError> {
        watch_vault(self.clone())
    }
}

fn heading_regex() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| {
        Regex::new(r"^ {0,3}#{1,6}[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").expect("valid heading regex")
    })
}

/// ATX headings of a Markdown document, in order
///
/// Front matter and fenced code blocks are skipped, closing `#`s dropped.
pub fn extract_headings(content: &str) -> Vec<String> {
    let mut headings = Vec::new();
    let mut lines = content.lines().peekable();

    if lines.peek().map(|line| line.trim_end() == "---").unwrap_or(false) {
        lines.next();
        for line in lines.by_ref() {
            let line = line.trim_end();
            if line == "---" || line == "..." {
                break;
            }
        }
    }

    let mut fence: Option<&str> = None;
    for line in lines {
        let trimmed = line.trim_start();
        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            continue;
        }
        if trimmed.starts_with("```") {
            fence = Some("```");
            continue;
        }
        if trimmed.starts_with("~~~") {
            fence = Some("~~~");
            continue;
        }

        if let Some(captures) = heading_regex().captures(line) {
            headings.push(captures[1].trim().to_string());
        }
    }

    headings
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_extract_headings() {
        let content = "\
---
title: Trip
# not a heading
---
# 202307281200 Trip to Portland
Some text
## 202307290900 Breakfast ##
```
# 202307291000 Inside code
```
####### Too deep
#NoSpace
   ### Indented
";
        assert_eq!(
            extract_headings(content),
            vec![
                "202307281200 Trip to Portland",
                "202307290900 Breakfast",
                "Indented",
            ]
        );
    }

    #[test]
    fn test_extract_headings_empty() {
        assert!(extract_headings("").is_empty());
        assert!(extract_headings("just text\nmore text").is_empty());
    }

    #[tokio::test]
    async fn test_list_documents() {
        let dir = tempdir().unwrap();
        write(dir.path(), "202307141744 Testing.md", "");
        write(dir.path(), "Work/Calls/202307021555 Call with Sally.md", "");
        write(dir.path(), "Work/attachment.png", "");
        write(dir.path(), ".obsidian/202301010000 workspace.md", "");
        write(dir.path(), "Work/.trash/202301010000 old.md", "");

        let vault = FsVault::new(dir.path());
        let documents = vault.list_documents().await.unwrap();

        assert_eq!(
            documents,
            vec![
                DocumentRecord::new("202307141744 Testing", "202307141744 Testing.md"),
                DocumentRecord::new(
                    "202307021555 Call with Sally",
                    "Work/Calls/202307021555 Call with Sally.md"
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_include_hidden() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".archive/202301010000 old.md", "");

        let vault = FsVault::new(dir.path()).include_hidden(true);
        let documents = vault.list_documents().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].path, ".archive/202301010000 old.md");
    }

    #[tokio::test]
    async fn test_missing_root() {
        let dir = tempdir().unwrap();
        let vault = FsVault::new(dir.path().join("nope"));
        assert!(matches!(
            vault.list_documents().await,
            Err(SourceError::RootNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_headings_from_file() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "Trips/202307281200 Trip.md",
            "# Plan\n## 202307290900 Breakfast\n",
        );

        let vault = FsVault::new(dir.path());
        let documents = vault.list_documents().await.unwrap();
        let headings = vault.headings(&documents[0]).await.unwrap();
        assert_eq!(headings, vec!["Plan", "202307290900 Breakfast"]);
    }

    #[test]
    fn test_accepts() {
        let vault = FsVault::new("/vault").extensions(vec!["md".to_string(), "txt".to_string()]);

        assert!(vault.accepts(Path::new("/vault/a.md")));
        assert!(vault.accepts(Path::new("/vault/notes/b.TXT")));
        assert!(!vault.accepts(Path::new("/vault/c.png")));
        assert!(!vault.accepts(Path::new("/vault/.obsidian/d.md")));
        assert!(!vault.accepts(Path::new("/elsewhere/e.md")));
    }

    #[test]
    fn test_resolved_root() {
        let dir = tempfile::Builder::new()
            .prefix("vault-root-")
            .tempdir_in(".")
            .unwrap();
        write(dir.path(), "202307141744 Testing.md", "");

        // Path from the working directory, like the default `.` root
        let relative = FsVault::new(dir.path().file_name().unwrap());
        assert!(relative.root().is_relative());

        let resolved = relative.clone().resolved();
        assert!(resolved.root().is_absolute());
        let absolute = resolved.root().join("202307141744 Testing.md");
        assert!(resolved.accepts(&absolute));
        assert!(!relative.accepts(&absolute));

        let missing = FsVault::new("no/such/vault").resolved();
        assert_eq!(missing.root(), Path::new("no/such/vault"));
    }
}
