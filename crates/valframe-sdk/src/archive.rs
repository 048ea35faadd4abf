/*!
# Result Archives

Bundles the delimited files produced for a batch into one timestamped zip.
*/

use crate::{PipelineError, PipelineResult};
use chrono::Local;
use std::collections::{BTreeSet, HashSet};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive names look like `2024-03-09-14-30-00.125.zip`.
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S%.3f";

/// Every `.csv` file (extension compared case-insensitively) directly inside
/// the directories containing `paths`, sorted by path.
pub fn collect_csv_siblings<P: AsRef<Path>>(paths: &[P]) -> PipelineResult<Vec<PathBuf>> {
    let dirs: BTreeSet<PathBuf> = paths
        .iter()
        .map(|path| match path.as_ref().parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        })
        .collect();

    let mut files = Vec::new();
    for dir in dirs {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv && path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Zip every `.csv` sibling of `paths` into `out_dir`, returning the archive
/// path. Entries are stored under their file names.
pub fn create_archive<P: AsRef<Path>>(paths: &[P], out_dir: &Path) -> PipelineResult<PathBuf> {
    let files = collect_csv_siblings(paths)?;
    if files.is_empty() {
        let shown = paths
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(PipelineError::NoCsvFiles(shown));
    }

    fs::create_dir_all(out_dir)?;
    let archive_path = out_dir.join(format!(
        "{}.zip",
        Local::now().format(ARCHIVE_TIMESTAMP_FORMAT)
    ));

    let mut zip = ZipWriter::new(File::create(&archive_path)?);
    let mut names = HashSet::new();

    for file in &files {
        let Some(name) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !names.insert(name.clone()) {
            warn!(path = %file.display(), "Skipping file with duplicate entry name");
            continue;
        }
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(name, options)?;
        io::copy(&mut File::open(file)?, &mut zip)?;
    }
    zip.finish()?;

    info!(path = %archive_path.display(), files = names.len(), "Created archive");
    Ok(archive_path)
}
