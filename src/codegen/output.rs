//! Writing an artifact pair to disk.
//!
//! Both files are staged as temporaries next to their destination and only
//! renamed into place once every temporary is complete. Targets that already
//! exist are hard-linked (or copied) aside first, so a rename failing halfway
//! through puts the previous pair back.
use std::fs;
use std::path::{Path, PathBuf};

use crate::codegen::emit::Artifacts;
use crate::codegen::error::CodegenError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub header: PathBuf,
    pub source: PathBuf,
}

struct Staged<'a> {
    tmp: PathBuf,
    target: &'a Path,
    backup: Option<PathBuf>,
}

pub fn write_artifacts(
    artifacts: &Artifacts,
    dir: &Path,
) -> Result<WrittenArtifacts, CodegenError> {
    fs::create_dir_all(dir).map_err(|err| CodegenError::io(dir, err))?;

    let header = dir.join(artifacts.header_file_name());
    let source = dir.join(artifacts.source_file_name());

    let mut staged: Vec<Staged<'_>> = Vec::with_capacity(2);
    for (target, content) in [(&header, &artifacts.header), (&source, &artifacts.source)] {
        let tmp = sibling(target, "tmp");
        if let Err(err) = fs::write(&tmp, content) {
            let _ = fs::remove_file(&tmp);
            discard(&staged);
            return Err(CodegenError::io(tmp, err));
        }
        staged.push(Staged {
            tmp,
            target: target.as_path(),
            backup: None,
        });
    }

    for idx in 0..staged.len() {
        match back_up(staged[idx].target) {
            Ok(backup) => staged[idx].backup = backup,
            Err(err) => {
                discard(&staged);
                return Err(err);
            }
        }
    }

    for (idx, file) in staged.iter().enumerate() {
        if let Err(err) = fs::rename(&file.tmp, file.target) {
            roll_back(&staged[..idx]);
            discard(&staged[idx..]);
            return Err(CodegenError::io(file.target, err));
        }
        log::debug!("wrote {}", file.target.display());
    }

    for file in &staged {
        if let Some(backup) = &file.backup {
            let _ = fs::remove_file(backup);
        }
    }

    Ok(WrittenArtifacts { header, source })
}

/// Hidden per-process sibling, e.g. `out/.net.h.1234.tmp`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    path.with_file_name(format!(".{file_name}.{}.{suffix}", std::process::id()))
}

fn back_up(target: &Path) -> Result<Option<PathBuf>, CodegenError> {
    if !target.is_file() {
        return Ok(None);
    }
    let backup = sibling(target, "bak");
    let _ = fs::remove_file(&backup);
    if fs::hard_link(target, &backup).is_err() {
        fs::copy(target, &backup).map_err(|err| CodegenError::io(backup.as_path(), err))?;
    }
    Ok(Some(backup))
}

/// Undoes renames that already happened.
fn roll_back(renamed: &[Staged<'_>]) {
    for file in renamed {
        match &file.backup {
            Some(backup) => {
                if let Err(err) = fs::rename(backup, file.target) {
                    log::warn!(
                        "could not restore {} from {}: {}",
                        file.target.display(),
                        backup.display(),
                        err
                    );
                }
            }
            None => {
                let _ = fs::remove_file(file.target);
            }
        }
    }
}

fn discard(staged: &[Staged<'_>]) {
    for file in staged {
        let _ = fs::remove_file(&file.tmp);
        if let Some(backup) = &file.backup {
            let _ = fs::remove_file(backup);
        }
    }
}
