use crate::core::{RegistryStore, StudentDb};
use crate::utils::error::Result;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Flat-file store. Saves go through a sibling temporary file that replaces
/// the target only after a complete write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    create_if_missing: bool,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>, create_if_missing: bool) -> Self {
        Self {
            path: path.into(),
            create_if_missing,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RegistryStore for FileStorage {
    fn load_into(&self, db: &mut StudentDb) -> Result<()> {
        if !self.path.exists() && self.create_if_missing {
            tracing::info!(
                "Data file {} does not exist yet, starting empty",
                self.path.display()
            );
            db.clear();
            return Ok(());
        }

        tracing::debug!("Loading registry from {}", self.path.display());
        let file = File::open(&self.path)?;
        db.read(BufReader::new(file))
    }

    fn save(&self, db: &StudentDb) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        if let Err(e) = write_snapshot(&temp_path, db) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        fs::rename(&temp_path, &self.path)?;
        tracing::debug!("Saved registry to {}", self.path.display());
        Ok(())
    }
}

fn write_snapshot(path: &Path, db: &StudentDb) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    db.write(&mut writer)?;
    writer.flush()?;
    Ok(())
}
