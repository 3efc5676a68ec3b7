//! Write-then-rename installation of artifacts
//!
//! Files are written under `<out>/.orbit-staging/` and renamed into place
//! only once every file of the unit is on disk. A target directory is
//! swapped as a whole, so readers see either the previous set or the new one.
//!
//! Each target directory records the files orbit generated in it. On a swap
//! everything else (`go.mod`, `package.json`, `node_modules/`) moves into the
//! new directory, and generated files the new run no longer produces are
//! dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use codegen::GeneratedArtifact;
use types::TargetLanguage;

/// Staging directory name under the output directory.
pub const STAGING_DIR: &str = ".orbit-staging";

/// File listing what orbit generated in a target directory.
pub const MANIFEST_FILE: &str = ".orbit-generated";

fn staging_root(out_dir: &Path) -> PathBuf { out_dir.join(STAGING_DIR) }

/// Write one file: a sibling temporary file renamed over `path`.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        e
    })
}

/// Install shared artifacts (no target), one atomic write each.
pub fn install_shared(out_dir: &Path, artifacts: &[GeneratedArtifact]) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for artifact in artifacts {
        let path = out_dir.join(&artifact.path);
        write_atomic(&path, &artifact.content)?;
        tracing::debug!(path = %path.display(), "wrote artifact");
        written.push(path);
    }
    Ok(written)
}

/// Install every artifact of `target` as one unit under `<out>/<target>`.
///
/// Artifact paths must lie under `<target>/`. On error the previous
/// directory is left in place.
pub fn install_target(
    out_dir: &Path,
    target: TargetLanguage,
    artifacts: &[GeneratedArtifact],
) -> io::Result<Vec<PathBuf>> {
    let staged = staging_root(out_dir).join(target.as_str());
    if staged.exists() {
        fs::remove_dir_all(&staged)?;
    }
    fs::create_dir_all(&staged)?;

    let mut relative = Vec::new();
    for artifact in artifacts {
        let rel = artifact.path.strip_prefix(target.as_str()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not under {}/", artifact.path.display(), target),
            )
        })?;
        let path = staged.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &artifact.content)?;
        relative.push(rel.to_path_buf());
    }

    write_manifest(&staged, &relative)?;

    let destination = orbit_path::target_dir(out_dir, target);
    let retired = staging_root(out_dir).join(format!("{}.previous", target.as_str()));
    if retired.exists() {
        fs::remove_dir_all(&retired)?;
    }
    if destination.exists() {
        let mut owned = read_manifest(&destination)?;
        owned.extend(relative.iter().cloned());
        let kept = carry_over(&destination, &staged, &owned)?;
        if let Err(e) = fs::rename(&destination, &retired) {
            move_entries(&staged, &destination, &kept);
            return Err(e);
        }
        if let Err(e) = fs::rename(&staged, &destination) {
            move_entries(&staged, &retired, &kept);
            fs::rename(&retired, &destination)?;
            return Err(e);
        }
        fs::remove_dir_all(&retired)?;
    } else {
        fs::rename(&staged, &destination)?;
    }
    tracing::debug!(%target, files = relative.len(), dir = %destination.display(), "installed target");
    Ok(relative.into_iter().map(|rel| destination.join(rel)).collect())
}

fn write_manifest(dir: &Path, files: &[PathBuf]) -> io::Result<()> {
    let mut lines: Vec<String> = files.iter().map(|f| f.to_string_lossy().replace('\\', "/")).collect();
    lines.sort();
    lines.push(String::new());
    fs::write(dir.join(MANIFEST_FILE), lines.join("\n"))
}

/// Files a previous run generated in `dir`; empty when it left no manifest.
fn read_manifest(dir: &Path) -> io::Result<Vec<PathBuf>> {
    match fs::read_to_string(dir.join(MANIFEST_FILE)) {
        Ok(text) => Ok(text.lines().filter(|l| !l.trim().is_empty()).map(PathBuf::from).collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Move the top-level entries of `from` that no generated path lives under.
///
/// Returns the moved names. On error the entries moved so far are put back.
fn carry_over(from: &Path, to: &Path, owned: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let owned_roots: Vec<&std::ffi::OsStr> =
        owned.iter().filter_map(|p| p.components().next()).map(|c| c.as_os_str()).collect();
    let mut moved = Vec::new();
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let name = entry.file_name();
        if name == MANIFEST_FILE || owned_roots.contains(&name.as_os_str()) {
            continue;
        }
        if let Err(e) = fs::rename(entry.path(), to.join(&name)) {
            move_entries(to, from, &moved);
            return Err(e);
        }
        moved.push(PathBuf::from(name));
    }
    Ok(moved)
}

fn move_entries(from: &Path, to: &Path, names: &[PathBuf]) {
    for name in names {
        if let Err(e) = fs::rename(from.join(name), to.join(name)) {
            tracing::warn!(entry = %name.display(), error = %e, "could not restore entry");
        }
    }
}

/// Remove what an interrupted run left in the staging directory.
pub fn clear_staging(out_dir: &Path) -> io::Result<()> {
    let root = staging_root(out_dir);
    if root.exists() {
        fs::remove_dir_all(&root)?;
    }
    Ok(())
}
