pub mod config;
pub mod document;
pub mod time;

use std::fs;
use std::path::Path;

use log::info;

use crate::document::TimesheetDocument;

/// Writes the accumulated document text to `path`, creating parent
/// directories as needed.
pub fn write_time_sheet(
    document: &TimesheetDocument<'_>,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    info!("writing time sheet to `{}`", path.display());
    fs::write(path, document.text())?;

    Ok(())
}
