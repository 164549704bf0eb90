//! Synchronous world directory <-> zip snapshot conversion.
//!
//! Both directions stage their output next to the final location and rename
//! it into place once complete, so a failed run never leaves a partial
//! archive or a half-populated world directory behind.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ArchiveError;

/// Summary of a finished pack or unpack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Files written (directories not counted).
    pub files: usize,
    /// Uncompressed bytes.
    pub bytes: u64,
}

/// Sibling path used while `target` is being produced.
fn staging_path(target: &Path, suffix: &str) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{suffix}"))
}

/// Check if a zip entry name is safe (no path traversal or absolute paths).
fn is_safe_path(name: &str) -> bool {
    let path = Path::new(name);
    if path.is_absolute() || name.starts_with('/') || name.starts_with('\\') {
        return false;
    }
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Pack every file under `source` into the zip file `dest`.
pub fn pack_directory(source: &Path, dest: &Path) -> Result<ArchiveReport, ArchiveError> {
    if !source.is_dir() {
        return Err(ArchiveError::SourceMissing(source.to_path_buf()));
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(ArchiveError::io(parent))?;
    }

    let staging = staging_path(dest, "part");
    let result = write_zip(source, &staging);
    match result {
        Ok(report) => {
            if let Err(e) = fs::rename(&staging, dest) {
                fs::remove_file(&staging).ok();
                return Err(ArchiveError::io(dest)(e));
            }
            debug!(
                "Packed {} ({} files, {} bytes) into {}",
                source.display(),
                report.files,
                report.bytes,
                dest.display()
            );
            Ok(report)
        }
        Err(e) => {
            fs::remove_file(&staging).ok();
            Err(e)
        }
    }
}

fn write_zip(source: &Path, staging: &Path) -> Result<ArchiveReport, ArchiveError> {
    let file = File::create(staging).map_err(ArchiveError::io(staging))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut report = ArchiveReport::default();

    fn add_directory(
        zip: &mut ZipWriter<File>,
        base: &Path,
        current: &Path,
        options: SimpleFileOptions,
        report: &mut ArchiveReport,
    ) -> Result<(), ArchiveError> {
        let mut entries = fs::read_dir(current)
            .map_err(ArchiveError::io(current))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(ArchiveError::io(current))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let relative = path
                .strip_prefix(base)
                .map_err(|_| ArchiveError::UnsafeEntry(path.display().to_string()))?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if path.is_dir() {
                zip.add_directory(format!("{name}/"), options)?;
                add_directory(zip, base, &path, options, report)?;
            } else {
                zip.start_file(name, options)?;
                let mut input = File::open(&path).map_err(ArchiveError::io(&path))?;
                report.bytes += io::copy(&mut input, zip).map_err(ArchiveError::io(&path))?;
                report.files += 1;
            }
        }
        Ok(())
    }

    add_directory(&mut zip, source, source, options, &mut report)?;
    let file = zip.finish()?;
    file.sync_all().map_err(ArchiveError::io(staging))?;
    Ok(report)
}

/// Extract the zip file `archive` into `dest`, which must not exist yet.
pub fn unpack_archive(archive: &Path, dest: &Path) -> Result<ArchiveReport, ArchiveError> {
    if !archive.is_file() {
        return Err(ArchiveError::SourceMissing(archive.to_path_buf()));
    }
    if dest.exists() {
        return Err(ArchiveError::DestinationExists(dest.to_path_buf()));
    }

    let staging = staging_path(dest, "unpacking");
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(ArchiveError::io(&staging))?;
    }

    match read_zip(archive, &staging) {
        Ok(report) => {
            if let Err(e) = fs::rename(&staging, dest) {
                fs::remove_dir_all(&staging).ok();
                return Err(ArchiveError::io(dest)(e));
            }
            debug!(
                "Unpacked {} ({} files, {} bytes) into {}",
                archive.display(),
                report.files,
                report.bytes,
                dest.display()
            );
            Ok(report)
        }
        Err(e) => {
            fs::remove_dir_all(&staging).ok();
            Err(e)
        }
    }
}

fn read_zip(archive: &Path, staging: &Path) -> Result<ArchiveReport, ArchiveError> {
    let file = File::open(archive).map_err(ArchiveError::io(archive))?;
    let mut zip = ZipArchive::new(file)?;

    // Validate every entry before writing anything.
    for i in 0..zip.len() {
        let entry = zip.by_index(i)?;
        if !is_safe_path(entry.name()) {
            return Err(ArchiveError::UnsafeEntry(entry.name().to_string()));
        }
    }

    fs::create_dir_all(staging).map_err(ArchiveError::io(staging))?;
    let mut report = ArchiveReport::default();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let out = staging.join(entry.name());

        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(ArchiveError::io(&out))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(ArchiveError::io(parent))?;
        }
        let mut output = File::create(&out).map_err(ArchiveError::io(&out))?;
        report.bytes += io::copy(&mut entry, &mut output).map_err(ArchiveError::io(&out))?;
        output.sync_all().map_err(ArchiveError::io(&out))?;
        report.files += 1;
    }
    Ok(report)
}
