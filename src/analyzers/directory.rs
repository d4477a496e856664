//! Directory structure extraction
//!
//! Walks a project tree into a nested [`DirectoryTree`], pruning ignored
//! directories before descent at every depth. Per-file stat failures are
//! logged and the file is dropped; only a failure at the root degrades the
//! whole analysis.

use crate::config::is_ignored_dir;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Metadata recorded per file during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    /// Extension with leading dot (".rs"), empty when absent.
    pub ext: String,
    pub size_kb: u64,
}

/// Nested directory map. Files of a directory sit next to its subdirectories,
/// so a depth-first flatten visits a directory's files before descending.
#[derive(Debug, Clone, Default)]
pub struct DirectoryTree {
    pub dirs: BTreeMap<String, DirectoryTree>,
    pub files: Vec<FileMeta>,
}

impl DirectoryTree {
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }

    /// Returns the node for a relative directory path, creating intermediate
    /// nodes as needed. An empty component list is the root itself.
    fn node_mut(&mut self, components: &[String]) -> &mut DirectoryTree {
        let mut node = self;
        for part in components {
            node = node.dirs.entry(part.clone()).or_default();
        }
        node
    }
}

/// Result of analyzing a project directory.
///
/// `file_count`/`dir_count` are `-1` and `top_level_dirs` empty when the walk
/// could not start; `scan_error` carries the reason and `structure` stays
/// empty so downstream sampling degrades to an empty sample set.
#[derive(Debug, Clone)]
pub struct DirectoryAnalysis {
    pub structure: DirectoryTree,
    pub scan_error: Option<String>,
    pub file_count: i64,
    pub dir_count: i64,
    pub top_level_dirs: Vec<String>,
}

/// Walks a project tree and extracts its structure with file metadata.
pub struct DirectoryScanner {
    project_path: PathBuf,
}

impl DirectoryScanner {
    pub fn new(project_path: PathBuf) -> Self {
        Self { project_path }
    }

    /// Analyzes the project directory. Never panics and never returns an
    /// error: all failures degrade into the returned analysis.
    pub fn analyze(&self) -> DirectoryAnalysis {
        if !self.project_path.is_dir() {
            let reason = if self.project_path.exists() {
                format!("Project path is not a directory: {}", self.project_path.display())
            } else {
                format!("Project path not found: {}", self.project_path.display())
            };
            error!(path = %self.project_path.display(), "{reason}");
            return DirectoryAnalysis {
                structure: DirectoryTree::default(),
                scan_error: Some(reason),
                file_count: -1,
                dir_count: -1,
                top_level_dirs: Vec::new(),
            };
        }

        let mut structure = DirectoryTree::default();
        let mut file_count: i64 = 0;
        let mut dir_count: i64 = 0;

        let walker = WalkBuilder::new(&self.project_path)
            .standard_filters(false)
            .filter_entry(|entry| {
                // Prune ignored directories before descending into them.
                match entry.file_type() {
                    Some(ft) if ft.is_dir() => entry
                        .file_name()
                        .to_str()
                        .map(|name| !is_ignored_dir(name))
                        .unwrap_or(true),
                    _ => true,
                }
            })
            .build();

        for result in walker {
            let entry = match result {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "Failed to read directory entry, skipping");
                    continue;
                }
            };

            let path = entry.path();
            if path == self.project_path {
                continue;
            }

            let rel = match path.strip_prefix(&self.project_path) {
                Ok(r) => r,
                Err(_) => continue,
            };

            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            if is_dir {
                let components = rel_components(rel);
                structure.node_mut(&components);
                dir_count += 1;
                continue;
            }

            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };

            let size_kb = match entry.metadata() {
                Ok(meta) => meta.len() / 1024,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat file, omitting");
                    continue;
                }
            };

            let parent_components = rel
                .parent()
                .map(rel_components)
                .unwrap_or_default();

            structure.node_mut(&parent_components).files.push(FileMeta {
                ext: extension_of(&name),
                name,
                size_kb,
            });
            file_count += 1;
        }

        let top_level_dirs: Vec<String> = structure.dirs.keys().cloned().collect();

        info!(
            file_count,
            dir_count,
            top_level = top_level_dirs.len(),
            "Directory analysis completed"
        );
        debug!(top_level_dirs = ?top_level_dirs, "Top-level directories");

        DirectoryAnalysis {
            structure,
            scan_error: None,
            file_count,
            dir_count,
            top_level_dirs,
        }
    }
}

fn rel_components(rel: &Path) -> Vec<String> {
    rel.components()
        .filter_map(|c| c.as_os_str().to_str().map(|s| s.to_string()))
        .collect()
}

fn extension_of(name: &str) -> String {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!(".{ext}"),
        None => String::new(),
    }
}
