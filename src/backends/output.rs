//! Output backend - writing rendered artefacts, instruction file, clipboard

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::PackError;

/// One fully rendered output file, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub content: String,
}

/// Path of part `part_number` for a split output: `<stem>.<n>.<ext>`
pub fn split_output_path(base: &Path, part_number: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}.{}.{}", stem, part_number, ext.to_string_lossy()),
        None => format!("{}.{}", stem, part_number),
    };
    base.with_file_name(name)
}

/// Read the instruction file, resolved against `cwd`
pub fn read_instruction(cwd: &Path, path: &Path) -> Result<String, PackError> {
    let full = cwd.join(path);
    fs::read_to_string(&full).map_err(|source| PackError::InstructionFile { path: full, source })
}

fn write_error(path: &Path) -> impl FnOnce(std::io::Error) -> PackError + '_ {
    move |source| PackError::OutputWrite {
        path: path.to_path_buf(),
        source,
    }
}

/// Stage `artifact` in a temp file next to its destination
fn stage(artifact: &OutputArtifact) -> Result<NamedTempFile, PackError> {
    let parent = match artifact.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(write_error(&artifact.path))?;
            parent
        }
        None => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(parent).map_err(write_error(&artifact.path))?;
    staged
        .write_all(artifact.content.as_bytes())
        .and_then(|()| staged.flush())
        .map_err(write_error(&artifact.path))?;
    // Temp files are created owner-only; outputs get the usual file mode
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(write_error(&artifact.path))?;
    }
    Ok(staged)
}

/// Write every artefact, all or nothing.
///
/// Every artefact is first written to a temp file in its destination
/// directory. Only when all of them are staged are they renamed into place.
/// If a rename fails, the parts already in place are removed again, so a
/// failed run never leaves a partial set of parts behind.
pub fn write_outputs(artifacts: &[OutputArtifact]) -> Result<(), PackError> {
    let staged = artifacts
        .iter()
        .map(stage)
        .collect::<Result<Vec<_>, _>>()?;

    let mut persisted: Vec<&Path> = Vec::with_capacity(artifacts.len());
    for (artifact, temp) in artifacts.iter().zip(staged) {
        if let Err(err) = temp.persist(&artifact.path) {
            for path in &persisted {
                if let Err(e) = fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove partial output");
                }
            }
            return Err(write_error(&artifact.path)(err.error));
        }
        persisted.push(&artifact.path);
        debug!(path = %artifact.path.display(), bytes = artifact.content.len(), "output written");
    }
    Ok(())
}

#[cfg(feature = "clipboard")]
fn set_clipboard(text: &str) -> Result<(), String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_text(text.to_string()).map_err(|e| e.to_string())
}

#[cfg(not(feature = "clipboard"))]
fn set_clipboard(_text: &str) -> Result<(), String> {
    Err("built without clipboard support".to_string())
}

/// Copy `text` to the system clipboard. Failure is logged, never fatal.
pub fn copy_to_clipboard(text: &str) {
    match set_clipboard(text) {
        Ok(()) => debug!(bytes = text.len(), "output copied to clipboard"),
        Err(message) => warn!(error = %message, "failed to copy output to clipboard"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_split_output_path() {
        assert_eq!(
            split_output_path(Path::new("out/repopack-output.xml"), 2),
            PathBuf::from("out/repopack-output.2.xml")
        );
        assert_eq!(split_output_path(Path::new("pack"), 1), PathBuf::from("pack.1"));
    }

    #[test]
    fn test_read_instruction_relative_to_cwd() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("inst.md"), "Review this code.").unwrap();
        assert_eq!(
            read_instruction(dir.path(), Path::new("inst.md")).unwrap(),
            "Review this code."
        );
    }

    #[test]
    fn test_missing_instruction_is_error() {
        let dir = TempDir::new().unwrap();
        let err = read_instruction(dir.path(), Path::new("missing.md")).unwrap_err();
        assert!(matches!(err, PackError::InstructionFile { .. }));
    }

    #[test]
    fn test_write_outputs_creates_parents() {
        let dir = TempDir::new().unwrap();
        let artifacts = vec![
            OutputArtifact {
                path: dir.path().join("nested/a.txt"),
                content: "one".to_string(),
            },
            OutputArtifact {
                path: dir.path().join("b.txt"),
                content: "two".to_string(),
            },
        ];
        write_outputs(&artifacts).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("nested/a.txt")).unwrap(), "one");
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "two");
    }

    #[test]
    fn test_write_into_file_parent_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blocker"), "").unwrap();
        let artifacts = vec![OutputArtifact {
            path: dir.path().join("blocker/out.txt"),
            content: String::new(),
        }];
        assert!(matches!(
            write_outputs(&artifacts),
            Err(PackError::OutputWrite { .. })
        ));
    }

    #[test]
    fn test_failed_write_leaves_no_parts() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("out.2.txt")).unwrap();
        let artifacts = vec![
            OutputArtifact {
                path: dir.path().join("out.1.txt"),
                content: "one".to_string(),
            },
            OutputArtifact {
                path: dir.path().join("out.2.txt"),
                content: "two".to_string(),
            },
        ];

        let err = write_outputs(&artifacts).unwrap_err();
        assert!(matches!(err, PackError::OutputWrite { ref path, .. } if path.ends_with("out.2.txt")));
        assert!(!dir.path().join("out.1.txt").exists());

        // Only the pre-existing directory remains; no temp files are left over
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("out.2.txt")]);
    }
}
