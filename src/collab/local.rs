use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::collab::{Archive, Delivery, SourceEntry, SourceStore};
use crate::error::{ReportError, Result};

/// Reads sources from the local filesystem. Locations and paths are plain
/// filesystem paths; listings are sorted by name and carry each entry's
/// modification time.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSources;

impl SourceStore for LocalSources {
    fn list(&self, location: &str) -> Result<Vec<SourceEntry>> {
        let dir = Path::new(location);
        if !dir.is_dir() {
            return Err(ReportError::MissingInput(dir.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let metadata = entry.metadata()?;
            entries.push(SourceEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: path.to_string_lossy().into_owned(),
                is_folder: metadata.is_dir(),
                modified: metadata.modified().ok(),
            });
        }
        entries.sort_by(|lhs, rhs| lhs.name.cmp(&rhs.name));
        Ok(entries)
    }

    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }
}

/// Writes reports into a directory and moves or deletes consumed sources.
#[derive(Debug, Clone)]
pub struct LocalArchive {
    reports_dir: PathBuf,
}

impl LocalArchive {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    fn write_report(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.reports_dir)?;
        let path = self.reports_dir.join(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    fn move_file(&self, path: &Path, folder: &Path) -> Result<PathBuf> {
        fs::create_dir_all(folder)?;
        let name = path
            .file_name()
            .ok_or_else(|| ReportError::Store(format!("{} has no file name", path.display())))?;
        let destination = free_destination(folder, Path::new(name));
        fs::rename(path, &destination)?;
        Ok(destination)
    }
}

impl Archive for LocalArchive {
    fn store(&mut self, name: &str, bytes: &[u8]) -> bool {
        match self.write_report(name, bytes) {
            Ok(path) => {
                info!(path = %path.display(), "report stored");
                true
            }
            Err(err) => {
                error!(name, error = %err, "failed to store report");
                false
            }
        }
    }

    fn relocate(&mut self, path: &str, folder: &str) -> bool {
        match self.move_file(Path::new(path), Path::new(folder)) {
            Ok(destination) => {
                info!(from = path, to = %destination.display(), "source moved");
                true
            }
            Err(err) => {
                error!(path, folder, error = %err, "failed to move source");
                false
            }
        }
    }

    fn remove(&mut self, path: &str) -> bool {
        match fs::remove_file(path) {
            Ok(()) => {
                info!(path, "source deleted");
                true
            }
            Err(err) => {
                error!(path, error = %err, "failed to delete source");
                false
            }
        }
    }
}

/// `folder/name`, or `folder/stem (n).ext` for the first free `n`.
fn free_destination(folder: &Path, name: &Path) -> PathBuf {
    let candidate = folder.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = name
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = name
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = folder.join(format!("{stem} ({counter}){extension}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Prints the report body to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutDelivery;

impl Delivery for StdoutDelivery {
    fn send(&mut self, body: &str) -> bool {
        let mut stdout = std::io::stdout().lock();
        match writeln!(stdout, "{body}").and_then(|_| stdout.flush()) {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to write report to stdout");
                false
            }
        }
    }
}
