//! Heuristic file sampling under fixed size budgets
//!
//! Selects a bounded, representative subset of project files for the LLM
//! context. Output size is bounded by `MAX_FILES_IN_CONTEXT *
//! MAX_CHARS_PER_FILE` regardless of project size; this is the backpressure
//! mechanism protecting every downstream prompt.

use crate::analyzers::directory::{DirectoryTree, FileMeta};
use crate::config::{
    CODE_FILE_EXTENSIONS, CONFIG_EXTENSIONS, ENTRY_POINTS, IMPORTANT_FILES, MAX_CHARS_PER_FILE,
    MAX_FILES_IN_CONTEXT, MAX_LINES_PER_FILE, SMALL_FILE_KB,
};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Samples key files from a scanned directory structure.
pub struct FileSampler<'a> {
    project_path: &'a Path,
    structure: &'a DirectoryTree,
}

impl<'a> FileSampler<'a> {
    pub fn new(project_path: &'a Path, structure: &'a DirectoryTree) -> Self {
        Self {
            project_path,
            structure,
        }
    }

    /// Samples up to `max_files` files by importance, loading bounded content
    /// for each. A file that cannot be read contributes an inline error
    /// string instead of aborting the sample.
    pub fn sample(&self, max_files: usize) -> BTreeMap<String, String> {
        let mut all_files: Vec<(String, &FileMeta)> = Vec::new();
        collect_files(self.structure, "", &mut all_files);

        let mut scored: Vec<(String, u32)> = all_files
            .iter()
            .map(|(path, meta)| (path.clone(), score_file(meta)))
            .collect();

        // Stable sort keeps walk order between equal scores.
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        debug!(
            candidates = scored.len(),
            max_files, "Scored sampling candidates"
        );

        let mut samples = BTreeMap::new();
        for (rel_path, score) in scored.into_iter().take(max_files) {
            let content = self.load_bounded(&rel_path);
            debug!(path = %rel_path, score, chars = content.len(), "Sampled file");
            samples.insert(rel_path, content);
        }

        info!(sampled = samples.len(), "File sampling completed");
        samples
    }

    /// Convenience wrapper using the default budget.
    pub fn sample_default(&self) -> BTreeMap<String, String> {
        self.sample(MAX_FILES_IN_CONTEXT)
    }

    fn load_bounded(&self, rel_path: &str) -> String {
        let full_path = self.project_path.join(rel_path);

        let raw = match std::fs::read(&full_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(path = %rel_path, error = %e, "Failed to read sampled file");
                return format!("Error reading file {rel_path}: {e}");
            }
        };

        let content: String = raw.split_inclusive('\n').take(MAX_LINES_PER_FILE).collect();

        let total_chars = content.chars().count();
        if total_chars > MAX_CHARS_PER_FILE {
            let truncated: String = content.chars().take(MAX_CHARS_PER_FILE).collect();
            let elided = total_chars - MAX_CHARS_PER_FILE;
            format!("{truncated}\n... (truncated, {elided} more characters)")
        } else {
            content
        }
    }
}

/// Flattens the tree depth-first, a directory's files before its
/// subdirectories, preserving walk order.
fn collect_files<'t>(
    tree: &'t DirectoryTree,
    prefix: &str,
    out: &mut Vec<(String, &'t FileMeta)>,
) {
    for meta in &tree.files {
        let path = if prefix.is_empty() {
            meta.name.clone()
        } else {
            format!("{prefix}/{}", meta.name)
        };
        out.push((path, meta));
    }

    for (name, sub) in &tree.dirs {
        let sub_prefix = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        collect_files(sub, &sub_prefix, out);
    }
}

/// Additive importance score. Every heuristic is independent; a file matching
/// all five scores 21.
fn score_file(meta: &FileMeta) -> u32 {
    let mut score = 0;

    if IMPORTANT_FILES.contains(&meta.name.as_str()) {
        score += 10;
    }
    if ENTRY_POINTS.contains(&meta.name.as_str()) {
        score += 5;
    }
    if CONFIG_EXTENSIONS.contains(&meta.ext.as_str()) {
        score += 3;
    }
    if CODE_FILE_EXTENSIONS.contains(&meta.ext.as_str()) {
        score += 2;
    }
    if meta.size_kb < SMALL_FILE_KB {
        score += 1;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::directory::DirectoryScanner;
    use std::fs;
    use tempfile::TempDir;

    fn meta(name: &str, ext: &str, size_kb: u64) -> FileMeta {
        FileMeta {
            name: name.to_string(),
            ext: ext.to_string(),
            size_kb,
        }
    }

    #[test]
    fn test_score_is_additive() {
        // important + config ext + small
        assert_eq!(score_file(&meta("package.json", ".json", 1)), 14);
        // important + small
        assert_eq!(score_file(&meta("README.md", ".md", 2)), 11);
        // entry point + code ext + small
        assert_eq!(score_file(&meta("main.py", ".py", 1)), 8);
        // same file, too big for the small-file bonus
        assert_eq!(score_file(&meta("main.py", ".py", 50)), 7);
        // all five bonuses sum to 21
        assert_eq!(10 + 5 + 3 + 2 + 1, 21);
    }

    #[test]
    fn test_score_no_match() {
        assert_eq!(score_file(&meta("photo.bin", ".bin", 500)), 0);
    }

    #[test]
    fn test_stable_sort_preserves_walk_order_on_ties() {
        let mut tree = DirectoryTree::default();
        tree.files.push(meta("first.bin", ".bin", 500));
        tree.files.push(meta("second.bin", ".bin", 500));

        let mut out = Vec::new();
        collect_files(&tree, "", &mut out);
        assert_eq!(out[0].0, "first.bin");
        assert_eq!(out[1].0, "second.bin");
    }

    #[test]
    fn test_sample_bounds() {
        let dir = TempDir::new().unwrap();
        for i in 0..30 {
            fs::write(dir.path().join(format!("file{i:02}.rs")), "fn f() {}").unwrap();
        }

        let analysis = DirectoryScanner::new(dir.path().to_path_buf()).analyze();
        let sampler = FileSampler::new(dir.path(), &analysis.structure);
        let samples = sampler.sample(20);

        assert_eq!(samples.len(), 20);
        for content in samples.values() {
            assert!(content.chars().count() <= MAX_CHARS_PER_FILE + 64);
        }
    }

    #[test]
    fn test_truncation_marker() {
        let dir = TempDir::new().unwrap();
        let long_line = "x".repeat(9_000);
        fs::write(dir.path().join("big.md"), &long_line).unwrap();

        let analysis = DirectoryScanner::new(dir.path().to_path_buf()).analyze();
        let sampler = FileSampler::new(dir.path(), &analysis.structure);
        let samples = sampler.sample(5);

        let content = &samples["big.md"];
        assert!(content.contains("... (truncated, 4000 more characters)"));
        assert!(content.starts_with(&"x".repeat(100)));
    }

    #[test]
    fn test_line_cap_applies_before_char_cap() {
        let dir = TempDir::new().unwrap();
        let many_short_lines = "y\n".repeat(2_000);
        fs::write(dir.path().join("lines.txt"), &many_short_lines).unwrap();

        let analysis = DirectoryScanner::new(dir.path().to_path_buf()).analyze();
        let sampler = FileSampler::new(dir.path(), &analysis.structure);
        let samples = sampler.sample(5);

        let content = &samples["lines.txt"];
        assert_eq!(content.matches('\n').count(), MAX_LINES_PER_FILE);
    }

    #[test]
    fn test_important_files_beat_noise() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "# readme").unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        for i in 0..25 {
            fs::write(dir.path().join(format!("blob{i:02}.bin")), vec![0u8; 64]).unwrap();
        }

        let analysis = DirectoryScanner::new(dir.path().to_path_buf()).analyze();
        let sampler = FileSampler::new(dir.path(), &analysis.structure);
        let samples = sampler.sample(5);

        assert!(samples.contains_key("README.md"));
        assert!(samples.contains_key("package.json"));
    }

    #[test]
    fn test_unreadable_file_inlines_error() {
        let mut tree = DirectoryTree::default();
        tree.files.push(meta("ghost.md", ".md", 0));

        let dir = TempDir::new().unwrap();
        let sampler = FileSampler::new(dir.path(), &tree);
        let samples = sampler.sample(5);

        assert!(samples["ghost.md"].starts_with("Error reading file ghost.md:"));
    }

    #[test]
    fn test_empty_tree_yields_empty_samples() {
        let tree = DirectoryTree::default();
        let dir = TempDir::new().unwrap();
        let sampler = FileSampler::new(dir.path(), &tree);
        assert!(sampler.sample_default().is_empty());
    }
}
