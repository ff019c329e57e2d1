//! File discovery backend
//!
//! Walks the scan root with the ignore crate, applies include globs and the
//! ignore sources, and hands back a sorted candidate list.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::PackConfig;
use crate::core::paths::{make_relative, sort_paths};
use crate::error::PackError;

/// Project-level ignore file, always honoured (gitignore syntax)
pub const PROJECT_IGNORE_FILE: &str = ".repopackignore";

/// Built-in ignore set (gitignore syntax)
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // version control
    ".git/",
    ".hg/",
    ".svn/",
    ".hgignore",
    ".gitattributes",
    // dependencies and build output
    "node_modules/",
    "bower_components/",
    "jspm_packages/",
    "vendor/",
    "target/",
    "dist/",
    "build/",
    "out/",
    ".next/",
    ".nuxt/",
    ".cache/",
    ".venv/",
    "venv/",
    "__pycache__/",
    "*.pyc",
    ".pytest_cache/",
    ".mypy_cache/",
    ".tox/",
    ".gradle/",
    "coverage/",
    ".nyc_output/",
    // lock files
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "Cargo.lock",
    "Gemfile.lock",
    "poetry.lock",
    "Pipfile.lock",
    "composer.lock",
    "go.sum",
    // logs and temp files
    "*.log",
    "logs/",
    "tmp/",
    "temp/",
    "*.tmp",
    "*.swp",
    "*.swo",
    // OS and editor artefacts
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    ".idea/",
    ".vscode/",
    // environment files
    ".env",
    ".env.*",
    // our own output
    "repopack-output.txt",
    "repopack-output.xml",
    "repopack-output.md",
    "repopack-output.*.txt",
    "repopack-output.*.xml",
    "repopack-output.*.md",
];

/// Files and (optionally) empty directories found under the root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Candidate files in display order
    pub files: Vec<String>,
    /// Directories with no entries, sorted
    pub empty_dirs: Vec<String>,
}

/// Resolves include/ignore configuration into candidate paths
pub struct FileDiscoverer {
    root: PathBuf,
    include: GlobSet,
    ignore: Gitignore,
    use_gitignore: bool,
    include_empty_dirs: bool,
    output_path: Option<PathBuf>,
}

fn build_include_set(patterns: &[String]) -> Result<GlobSet, PackError> {
    let mut builder = GlobSetBuilder::new();
    if patterns.is_empty() {
        builder.add(compile_glob("**/*")?);
    }
    for pattern in patterns {
        builder.add(compile_glob(pattern.trim_start_matches("./"))?);
    }
    builder.build().map_err(|e| PackError::Glob {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

fn compile_glob(pattern: &str) -> Result<globset::Glob, PackError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| PackError::Glob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn build_ignore_matcher(root: &Path, config: &PackConfig) -> Result<Gitignore, PackError> {
    let mut builder = GitignoreBuilder::new(root);
    let defaults: &[&str] = if config.ignore.use_default_patterns {
        DEFAULT_IGNORE_PATTERNS
    } else {
        &[]
    };
    let custom = config.ignore.custom_patterns.iter().map(String::as_str);

    for pattern in defaults.iter().copied().chain(custom) {
        builder.add_line(None, pattern).map_err(|e| PackError::Glob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
    }
    builder.build().map_err(|e| PackError::Glob {
        pattern: "<ignore patterns>".to_string(),
        message: e.to_string(),
    })
}

/// True for the output file itself and its numbered split parts
fn is_output_artifact(path: &Path, output: &Path) -> bool {
    if path == output {
        return true;
    }
    if path.parent() != output.parent() {
        return false;
    }
    let (Some(stem), Some(ext)) = (
        output.file_stem().and_then(|s| s.to_str()),
        output.extension().and_then(|s| s.to_str()),
    ) else {
        return false;
    };
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };
    name.strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix('.'))
        .and_then(|rest| rest.strip_suffix(ext))
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

fn dir_is_empty(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

impl FileDiscoverer {
    /// Build a discoverer for `root`. `cwd` anchors the configured output
    /// path so it can be excluded from its own input.
    pub fn new(root: &Path, cwd: &Path, config: &PackConfig) -> Result<Self, PackError> {
        if !root.is_dir() {
            return Err(PackError::Discovery {
                root: root.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }
        let root = root.canonicalize().map_err(|e| PackError::Discovery {
            root: root.to_path_buf(),
            message: e.to_string(),
        })?;

        let output = cwd.join(config.output.resolved_file_path());
        let output_path = match output.parent().map(|p| p.canonicalize()) {
            Some(Ok(parent)) => output.file_name().map(|name| parent.join(name)),
            _ => None,
        };

        Ok(Self {
            include: build_include_set(&config.include)?,
            ignore: build_ignore_matcher(&root, config)?,
            use_gitignore: config.ignore.use_gitignore,
            include_empty_dirs: config.output.include_empty_directories,
            output_path,
            root,
        })
    }

    /// The canonical scan root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root and collect candidate paths. Any walk error aborts.
    pub fn discover(&self) -> Result<Discovery, PackError> {
        let matcher = self.ignore.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .follow_links(false)
            .parents(false)
            .ignore(false)
            .git_global(false)
            .git_ignore(self.use_gitignore)
            .git_exclude(self.use_gitignore)
            .require_git(false)
            .add_custom_ignore_filename(PROJECT_IGNORE_FILE)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !matcher.matched(entry.path(), is_dir).is_ignore()
            });

        let mut files = Vec::new();
        let mut empty_dirs = Vec::new();

        for entry in builder.build() {
            let entry = entry.map_err(|e| PackError::Discovery {
                root: self.root.clone(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if path == self.root {
                continue;
            }
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            let Some(relative) = make_relative(path, &self.root) else {
                continue;
            };

            if file_type.is_dir() {
                if self.include_empty_dirs && dir_is_empty(path) {
                    empty_dirs.push(relative);
                }
                continue;
            }
            if !file_type.is_file() {
                continue;
            }
            if let Some(output) = &self.output_path {
                if is_output_artifact(path, output) {
                    debug!(path = %relative, "skipping output file");
                    continue;
                }
            }
            if !self.include.is_match(&relative) {
                continue;
            }
            files.push(relative);
        }

        debug!(
            files = files.len(),
            empty_dirs = empty_dirs.len(),
            root = %self.root.display(),
            "discovery finished"
        );

        Ok(Discovery {
            files: sort_paths(files),
            empty_dirs: sort_paths(empty_dirs),
        })
    }
}

/// Discover candidate files under `root`
pub fn discover_files(root: &Path, cwd: &Path, config: &PackConfig) -> Result<Discovery, PackError> {
    FileDiscoverer::new(root, cwd, config)?.discover()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn discover(root: &Path, config: &PackConfig) -> Vec<String> {
        discover_files(root, root, config).unwrap().files
    }

    #[test]
    fn test_directories_sort_before_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "a");
        write(dir.path(), "dir/z.txt", "z");
        write(dir.path(), "b.txt", "b");
        assert_eq!(
            discover(dir.path(), &PackConfig::default()),
            vec!["dir/z.txt", "a.txt", "b.txt"]
        );
    }

    #[test]
    fn test_default_patterns_applied() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/lib.rs", "");
        write(dir.path(), "node_modules/pkg/index.js", "");
        write(dir.path(), "Cargo.lock", "");
        write(dir.path(), "debug.log", "");
        assert_eq!(discover(dir.path(), &PackConfig::default()), vec!["src/lib.rs"]);

        let mut config = PackConfig::default();
        config.ignore.use_default_patterns = false;
        assert_eq!(discover(dir.path(), &config).len(), 4);
    }

    #[test]
    fn test_include_and_custom_ignore() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/a.rs", "");
        write(dir.path(), "src/gen/b.rs", "");
        write(dir.path(), "README.md", "");
        let mut config = PackConfig::default();
        config.include = vec!["src/**/*.rs".to_string()];
        config.ignore.custom_patterns = vec!["src/gen/".to_string()];
        assert_eq!(discover(dir.path(), &config), vec!["src/a.rs"]);
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "top.rs", "");
        write(dir.path(), "nested/inner.rs", "");
        let mut config = PackConfig::default();
        config.include = vec!["*.rs".to_string()];
        assert_eq!(discover(dir.path(), &config), vec!["top.rs"]);
    }

    #[test]
    fn test_gitignore_honoured_without_git() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".gitignore", "secret/\n");
        write(dir.path(), "secret/key.txt", "");
        write(dir.path(), "keep.txt", "");
        assert_eq!(
            discover(dir.path(), &PackConfig::default()),
            vec![".gitignore", "keep.txt"]
        );

        let mut config = PackConfig::default();
        config.ignore.use_gitignore = false;
        assert!(discover(dir.path(), &config).contains(&"secret/key.txt".to_string()));
    }

    #[test]
    fn test_project_ignore_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), PROJECT_IGNORE_FILE, "*.md\n");
        write(dir.path(), "notes.md", "");
        write(dir.path(), "main.go", "");
        let files = discover(dir.path(), &PackConfig::default());
        assert!(files.contains(&"main.go".to_string()));
        assert!(!files.contains(&"notes.md".to_string()));
    }

    #[test]
    fn test_output_file_and_parts_excluded() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pack.txt", "old output");
        write(dir.path(), "pack.2.txt", "old part");
        write(dir.path(), "pack.notes.txt", "unrelated");
        let mut config = PackConfig::default();
        config.output.file_path = Some(PathBuf::from("pack.txt"));
        assert_eq!(discover(dir.path(), &config), vec!["pack.notes.txt"]);
    }

    #[test]
    fn test_dotfiles_visible() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".editorconfig", "root = true");
        assert_eq!(discover(dir.path(), &PackConfig::default()), vec![".editorconfig"]);
    }

    #[test]
    fn test_empty_directories() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "");
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        let mut config = PackConfig::default();
        assert!(discover_files(dir.path(), dir.path(), &config)
            .unwrap()
            .empty_dirs
            .is_empty());
        config.output.include_empty_directories = true;
        let found = discover_files(dir.path(), dir.path(), &config).unwrap();
        assert_eq!(found.empty_dirs, vec!["empty"]);
        assert_eq!(found.files, vec!["a.txt"]);
    }

    #[test]
    fn test_invalid_include_glob() {
        let dir = TempDir::new().unwrap();
        let mut config = PackConfig::default();
        config.include = vec!["src/[".to_string()];
        assert!(matches!(
            discover_files(dir.path(), dir.path(), &config),
            Err(PackError::Glob { .. })
        ));
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover_files(&missing, dir.path(), &PackConfig::default()),
            Err(PackError::Discovery { .. })
        ));
    }

    #[test]
    fn test_output_artifact_matching() {
        let out = Path::new("/w/repopack-output.xml");
        assert!(is_output_artifact(Path::new("/w/repopack-output.xml"), out));
        assert!(is_output_artifact(Path::new("/w/repopack-output.12.xml"), out));
        assert!(!is_output_artifact(Path::new("/w/repopack-output.a.xml"), out));
        assert!(!is_output_artifact(Path::new("/w/sub/repopack-output.1.xml"), out));
    }
}
