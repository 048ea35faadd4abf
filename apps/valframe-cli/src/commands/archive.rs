use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use std::path::PathBuf;
use valframe_sdk::create_archive;

pub fn execute(
    files: Vec<PathBuf>,
    out_dir: Option<PathBuf>,
    config: Option<PathBuf>,
) -> CliResult<()> {
    let config = CliConfig::load(config.as_deref())?;
    let out_dir = out_dir.or(config.archive_dir).ok_or_else(|| {
        CliError::InvalidConfig("no --out-dir given and no archive_dir configured".to_string())
    })?;

    let archive = create_archive(&files, &out_dir)?;
    println!("{}", archive.display());
    Ok(())
}
