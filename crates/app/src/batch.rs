//! Folder-level compress and extract runs.
//!
//! A run keeps going when a single file fails: the failure is logged,
//! counted in [`Metrics`], and the next file is processed. Only problems
//! that leave nothing to do (missing carrier, unreadable folder, no
//! carriers found) abort the run.
//!
//! Files are processed in sorted name order so the same folder always
//! produces the same container.

use catc_core::container::{Container, ContainerEntry};
use catc_core::error::{Error, Result};
use catc_core::metrics::Metrics;
use catc_core::{carrier, codec, CompressedBlock};
use std::fs;
use std::path::{Path, PathBuf};

/// Regular files in `folder` whose name ends with `ext`, sorted by name.
pub fn discover(folder: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(ext) && n.len() > ext.len());
        if matches && entry.file_type()?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Compress every matching file in `input_folder` into one container.
///
/// Files that cannot be read or encoded are recorded and skipped.
pub fn compress_folder(input_folder: &Path, ext: &str, metrics: &mut Metrics) -> Result<Container> {
    let files = discover(input_folder, ext)?;
    log::info!("compressing {} files from {}", files.len(), input_folder.display());

    let mut container = Container::new();
    for path in files {
        let name = display_name(&path);
        match compress_file(&path, &name) {
            Ok((entry, raw_len)) => add_entry(&mut container, entry, raw_len, metrics),
            Err(e) if e.is_empty_input() => {
                log::warn!("{name}: empty file, nothing to compress");
                metrics.record_failure(name, e);
            }
            Err(e) => {
                log::warn!("failed to compress {name}: {e}");
                metrics.record_failure(name, e);
            }
        }
    }

    Ok(container)
}

/// Push a compressed entry; it counts as processed only once it is in.
fn add_entry(container: &mut Container, entry: ContainerEntry, raw_len: usize, metrics: &mut Metrics) {
    let name = entry.name.clone();
    let compressed_len = entry.block.wire_len();
    match container.push(entry) {
        Ok(()) => {
            log::debug!("{name}: {raw_len} -> {compressed_len} bytes");
            metrics.record_file(raw_len, compressed_len);
        }
        Err(e) => {
            log::warn!("failed to add {name}: {e}");
            metrics.record_failure(name, e);
        }
    }
}

fn compress_file(path: &Path, name: &str) -> Result<(ContainerEntry, usize)> {
    let data = fs::read(path)?;
    let entry = ContainerEntry::compress(name, &data)?;
    Ok((entry, data.len()))
}

/// Compress `input_folder` and attach the container to `carrier_path`,
/// writing the combined file to `output_path`.
///
/// # Errors
/// Fails if the carrier does not exist, the folder cannot be read, or the
/// output cannot be written.
pub fn compress_and_attach(
    input_folder: &Path,
    ext: &str,
    carrier_path: &Path,
    output_path: &Path,
    metrics: &mut Metrics,
) -> Result<()> {
    if !carrier_path.is_file() {
        return Err(Error::Config(format!(
            "carrier file '{}' does not exist",
            carrier_path.display()
        )));
    }

    let container = compress_folder(input_folder, ext, metrics)?;
    let framed = container.frame()?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    carrier::attach_file(carrier_path, &framed, output_path)?;
    metrics.carriers_processed += 1;

    log::info!(
        "attached {} entries ({} bytes) to '{}', saved as '{}'",
        container.len(),
        framed.len(),
        carrier_path.display(),
        output_path.display()
    );
    Ok(())
}

/// Extract the container from one carrier and write every entry into
/// `output_folder`.
///
/// # Errors
/// `MarkerNotFound` or `CorruptContainer` abort this carrier. Entries that
/// fail individually are recorded and skipped.
pub fn extract_and_decompress(carrier_file: &Path, output_folder: &Path, metrics: &mut Metrics) -> Result<()> {
    let payload = carrier::extract_file(carrier_file)?;
    let container = Container::unframe(&payload)?;
    metrics.carriers_processed += 1;

    fs::create_dir_all(output_folder)?;
    for entry in &container {
        let Some(file_name) = safe_file_name(&entry.name) else {
            log::warn!("refusing entry name {:?}: not a plain file name", entry.name);
            metrics.files_skipped += 1;
            continue;
        };

        match decompress_entry(entry, &output_folder.join(file_name)) {
            Ok(raw_len) => metrics.record_file(raw_len, entry.block.wire_len()),
            Err(e) => {
                log::warn!("failed to decompress {}: {e}", entry.name);
                metrics.record_failure(entry.name.clone(), e);
            }
        }
    }

    log::info!(
        "extracted {} entries from '{}' to '{}'",
        container.len(),
        carrier_file.display(),
        output_folder.display()
    );
    Ok(())
}

fn decompress_entry(entry: &ContainerEntry, output: &Path) -> Result<usize> {
    let data = entry.decompress()?;
    fs::write(output, &data)?;
    Ok(data.len())
}

/// Extract every carrier in `input_folder` into `<output_folder>/<stem>/`.
///
/// A carrier without a payload or with a corrupt container is counted and
/// skipped. Returns the number of carriers found.
///
/// # Errors
/// Fails if the folder cannot be read or holds no carriers.
pub fn extract_folder(
    input_folder: &Path,
    output_folder: &Path,
    carrier_ext: &str,
    metrics: &mut Metrics,
) -> Result<usize> {
    let carriers = discover(input_folder, carrier_ext)?;
    if carriers.is_empty() {
        return Err(Error::Config(format!(
            "no {carrier_ext} files found in '{}'",
            input_folder.display()
        )));
    }

    for carrier_file in &carriers {
        let stem = carrier_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = output_folder.join(&stem);

        match extract_and_decompress(carrier_file, &target, metrics) {
            Ok(()) => {}
            Err(e) if e.is_marker_not_found() => {
                log::warn!("{}: no attached data", carrier_file.display());
                metrics.carriers_without_payload += 1;
            }
            Err(Error::CorruptContainer(e)) => {
                log::error!("{}: corrupt container: {e}", carrier_file.display());
                metrics.carriers_corrupt += 1;
            }
            Err(e) => {
                log::error!("failed to extract {}: {e}", carrier_file.display());
                metrics.record_failure(display_name(carrier_file), e);
            }
        }
    }

    Ok(carriers.len())
}

/// Compress one file into a standalone block file.
pub fn pack_file(input: &Path, output: &Path, metrics: &mut Metrics) -> Result<()> {
    let data = fs::read(input)?;
    let bytes = codec::encode(&data)?.to_bytes()?;
    fs::write(output, &bytes)?;
    metrics.record_file(data.len(), bytes.len());

    log::info!(
        "'{}' compressed and saved as '{}' ({} -> {} bytes)",
        input.display(),
        output.display(),
        data.len(),
        bytes.len()
    );
    Ok(())
}

/// Decompress a standalone block file.
pub fn unpack_file(input: &Path, output: &Path, metrics: &mut Metrics) -> Result<()> {
    let bytes = fs::read(input)?;
    let data = codec::decode(&CompressedBlock::from_bytes(&bytes)?)?;
    fs::write(output, &data)?;
    metrics.record_file(data.len(), bytes.len());

    log::info!(
        "'{}' decompressed and saved as '{}'",
        input.display(),
        output.display()
    );
    Ok(())
}

/// `name` if writing it under a folder cannot escape that folder.
fn safe_file_name(name: &str) -> Option<&str> {
    let is_plain = Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);
    let has_separator = name.contains('/') || name.contains('\\');
    (is_plain && !has_separator).then_some(name)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
