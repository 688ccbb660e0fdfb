use crate::config::Config;
use crate::downloader::encode_table;
use crate::error::{DashboardError, Result};
use crate::loader::load_table;
use crate::table::Table;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The two files behind the dashboard: primary records and annotations.
///
/// Every save is a whole-file rewrite: the new content goes to a temporary
/// file in the destination directory which is then renamed over the target.
#[derive(Clone, Debug)]
pub struct Storage {
    primary_path: PathBuf,
    annotations_path: PathBuf,
    note_column: Option<String>,
}

impl Storage {
    /// Create a storage over the two files
    ///
    /// # Arguments
    /// * `primary_path` - File holding the sales records
    /// * `annotations_path` - File holding the notes, may not exist yet
    pub fn new(primary_path: impl Into<PathBuf>, annotations_path: impl Into<PathBuf>) -> Self {
        Storage {
            primary_path: primary_path.into(),
            annotations_path: annotations_path.into(),
            note_column: None,
        }
    }

    /// Storage for the configured files, with the schema's note column
    pub fn from_config(config: &Config) -> Self {
        Storage::new(&config.primary_path, &config.annotations_path)
            .with_note_column(&config.schema.annotation_column)
    }

    /// Marks the free-text note column
    ///
    /// Its cells are written with text wrap enabled and read back from CSV
    /// exactly as stored, without number, boolean or date detection.
    ///
    /// # Arguments
    /// * `column` - Header of the note column
    pub fn with_note_column(mut self, column: impl Into<String>) -> Self {
        self.note_column = Some(column.into());
        self
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary_path
    }

    pub fn annotations_path(&self) -> &Path {
        &self.annotations_path
    }

    /// Read the primary dataset
    ///
    /// # Returns
    /// * `Result<Table>` - The records, or `FileRead` for missing or malformed files
    pub fn load_primary(&self) -> Result<Table> {
        let table = load_table(&self.primary_path, self.note_column.as_slice())?;
        log::info!(
            "loaded {} records from {}",
            table.len(),
            self.primary_path.display()
        );
        Ok(table)
    }

    /// Read the annotations
    ///
    /// An absent file is the normal first-run state and yields an empty
    /// table. A present but unreadable file is an error.
    ///
    /// # Returns
    /// * `Result<Table>` - The annotations, empty when the file does not exist
    pub fn load_annotations(&self) -> Result<Table> {
        match self.read_annotations() {
            Err(DashboardError::AnnotationsMissing(path)) => {
                log::debug!("no annotations at {}, starting empty", path.display());
                Ok(Table::default())
            }
            other => other,
        }
    }

    fn read_annotations(&self) -> Result<Table> {
        if !self.annotations_path.exists() {
            return Err(DashboardError::AnnotationsMissing(
                self.annotations_path.clone(),
            ));
        }
        load_table(&self.annotations_path, self.note_column.as_slice())
    }

    /// Replace the primary file with `table`
    ///
    /// # Returns
    /// * `Result<()>` - `FileWrite` if encoding or writing fails; the old file is then untouched
    pub fn save_primary(&self, table: &Table) -> Result<()> {
        self.save(&self.primary_path, table)
    }

    /// Replace the annotations file with `table`
    pub fn save_annotations(&self, table: &Table) -> Result<()> {
        self.save(&self.annotations_path, table)
    }

    /// Write both files or neither
    ///
    /// Both tables are serialized and staged next to their targets before
    /// either target is replaced.
    ///
    /// # Arguments
    /// * `primary` - New primary records
    /// * `annotations` - New annotations
    ///
    /// # Returns
    /// * `Result<()>` - `FileWrite` on the first failure
    pub fn save_both(&self, primary: &Table, annotations: &Table) -> Result<()> {
        let staged_primary = self.stage(&self.primary_path, primary)?;
        let staged_annotations = self.stage(&self.annotations_path, annotations)?;
        commit(staged_primary, &self.primary_path)?;
        commit(staged_annotations, &self.annotations_path)?;
        log::info!(
            "saved {} records to {} and {} annotations to {}",
            primary.len(),
            self.primary_path.display(),
            annotations.len(),
            self.annotations_path.display()
        );
        Ok(())
    }

    fn save(&self, path: &Path, table: &Table) -> Result<()> {
        let staged = self.stage(path, table)?;
        commit(staged, path)?;
        log::info!("saved {} rows to {}", table.len(), path.display());
        Ok(())
    }

    fn stage(&self, path: &Path, table: &Table) -> Result<NamedTempFile> {
        let bytes = encode_table(path, table, self.note_column.as_deref())?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir).map_err(|e| DashboardError::write(path, e))?;
        staged
            .write_all(&bytes)
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| DashboardError::write(path, e))?;
        Ok(staged)
    }
}

fn commit(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged
        .persist(path)
        .map_err(|e| DashboardError::write(path, e.error))?;
    Ok(())
}
