//! Deterministic directory walk with pruning and an extension allow-list.

use std::path::{Path, PathBuf};

use crate::config::{EXCLUDED_DIRS, EXCLUDED_PATHS};

/// A file selected for indexing: absolute path plus the root-relative
/// `/`-separated path used as the chunk key.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    pub path: PathBuf,
    pub relative: String,
}

/// Walk `root` in sorted order, pruning hidden and excluded directories,
/// and collect files whose lowercase extension is in `extensions`
/// (dotted, e.g. `".py"`).
pub fn walk_source_files(root: &Path, extensions: &[&str]) -> Vec<WalkedFile> {
    let mut files = Vec::new();
    walk_dir(root, root, extensions, &mut files);
    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    files
}

fn walk_dir(dir: &Path, root: &Path, extensions: &[&str], out: &mut Vec<WalkedFile>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot read directory {}: {}", dir.display(), e);
            return;
        }
    };

    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_dir() {
            if is_excluded_dir(name) || is_excluded_path(&path, root) {
                continue;
            }
            walk_dir(&path, root, extensions, out);
        } else if !name.starts_with('.') && has_allowed_extension(name, extensions) {
            let relative = relative_path(&path, root);
            out.push(WalkedFile { path, relative });
        }
    }
}

fn is_excluded_dir(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
}

fn is_excluded_path(path: &Path, root: &Path) -> bool {
    let rel = relative_path(path, root);
    EXCLUDED_PATHS.iter().any(|p| rel == *p)
}

fn has_allowed_extension(name: &str, extensions: &[&str]) -> bool {
    match name.rfind('.') {
        Some(pos) if pos > 0 => {
            let ext = name[pos..].to_lowercase();
            extensions.contains(&ext.as_str())
        }
        _ => false,
    }
}

fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTS: &[&str] = crate::config::CODE_EXTENSIONS;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_finds_code_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/main.py", "print('hello')");
        write(dir.path(), "src/lib.cs", "class Lib {}");

        let files = walk_source_files(dir.path(), EXTS);
        let names: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(names, vec!["src/lib.cs", "src/main.py"]);
    }

    #[test]
    fn test_prunes_hidden_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".git/config.py", "secret");
        assert!(walk_source_files(dir.path(), EXTS).is_empty());
    }

    #[test]
    fn test_prunes_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "node_modules/pkg/index.js", "module.exports = {}");
        write(dir.path(), "app.js", "const x = 1");

        let files = walk_source_files(dir.path(), EXTS);
        let names: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(names, vec!["app.js"]);
    }

    #[test]
    fn test_prunes_build_artifacts_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "build/_artifacts/nuget/pkg.json", "{}");
        write(dir.path(), "build/keep.py", "x = 1");
        write(dir.path(), "src.py", "x = 1");

        let files = walk_source_files(dir.path(), EXTS);
        let names: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(names, vec!["build/keep.py", "src.py"]);
    }

    #[test]
    fn test_excludes_non_code_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "image.png", "binary");
        write(dir.path(), "readme.txt", "text");
        write(dir.path(), "code.py", "x = 1");

        let files = walk_source_files(dir.path(), EXTS);
        let names: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(names, vec!["code.py"]);
    }

    #[test]
    fn test_case_insensitive_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Main.CS", "class Main {}");
        let files = walk_source_files(dir.path(), EXTS);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_deterministic_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.py", "a.py", "b.py"] {
            write(dir.path(), name, "x = 1");
        }
        let files = walk_source_files(dir.path(), EXTS);
        let names: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(names, vec!["a.py", "b.py", "c.py"]);
    }

    #[test]
    fn test_dotfile_without_extension_excluded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".gitignore", "target/");
        assert!(walk_source_files(dir.path(), EXTS).is_empty());
    }

    #[test]
    fn test_document_extension_set() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "report.pdf", "fake");
        write(dir.path(), "notes.md", "# hi");
        let files = walk_source_files(dir.path(), crate::config::DOC_EXTENSIONS);
        let names: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(names, vec!["report.pdf"]);
    }
}
