use crate::config::Schema;
use crate::error::{DashboardError, Result};
use crate::storage::Storage;
use crate::table::{Table, Value};
use chrono::{DateTime, Local};

/// Two-state machine guarding the save action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
}

impl SaveState {
    /// Idle -> Saving. A second save while one is running is refused.
    ///
    /// `Dashboard::save_table` holds `&mut self` and the web layer serializes
    /// requests behind one mutex, so through those callers this only fires
    /// if a save path forgets to call [`SaveState::finish`].
    pub fn begin(&mut self) -> Result<()> {
        match self {
            SaveState::Saving => Err(DashboardError::SaveInProgress),
            SaveState::Idle => {
                *self = SaveState::Saving;
                Ok(())
            }
        }
    }

    /// Saving -> Idle, on success and on failure alike.
    pub fn finish(&mut self) {
        *self = SaveState::Idle;
    }
}

/// Outcome of a successful save, shown to the user before the page redraws.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveReport {
    pub saved_annotations: Table,
    pub record_count: usize,
    pub saved_at: DateTime<Local>,
}

/// Extracts the key and note columns, keeping only rows that carry a note.
///
/// Notes are copied verbatim, whitespace included. Only empty notes are dropped.
pub fn derive_annotations(view: &Table, schema: &Schema) -> Table {
    let mut annotations = Table::new(vec![
        schema.key_column.clone(),
        schema.annotation_column.clone(),
    ]);
    let Some(note_idx) = view.column_index(&schema.annotation_column) else {
        return annotations;
    };
    let key_idx = view.column_index(&schema.key_column);

    for row in &view.rows {
        let note = match row.get(note_idx) {
            Some(Value::Text(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => continue,
        };
        if note.is_empty() {
            continue;
        }
        let key = key_idx
            .and_then(|idx| row.get(idx))
            .cloned()
            .unwrap_or_default();
        annotations.push_row(vec![key, Value::Text(note)]);
    }
    annotations
}

/// Writes the snapshot as the new primary dataset and its notes as the new
/// annotations dataset, both files or neither.
pub fn write_snapshot(storage: &Storage, snapshot: &Table, schema: &Schema) -> Result<Table> {
    let annotations = derive_annotations(snapshot, schema);
    storage.save_both(snapshot, &annotations)?;
    Ok(annotations)
}
