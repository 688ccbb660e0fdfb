use crate::config::Schema;
use crate::table::{Table, Value};
use std::collections::HashMap;

/// Left-joins the annotations onto the primary records by the key column.
///
/// * every primary row is kept, in order; rows without a matching annotation
///   get an empty note
/// * a key annotated more than once yields one row per annotation
///   (relational multiplication, no dedup)
/// * an annotation table without the key or note column counts as empty
/// * a note column already present in the primary table is replaced, the
///   annotations file is authoritative
///
/// The note column is always the last column of the result.
pub fn merge_annotations(primary: &Table, annotations: &Table, schema: &Schema) -> Table {
    let note_column = schema.annotation_column.as_str();
    let base = primary.without_column(note_column);

    let duplicates = base.duplicate_keys(&schema.key_column);
    if !duplicates.is_empty() {
        log::warn!(
            "{} duplicate {} values in primary data (first: {})",
            duplicates.len(),
            schema.key_column,
            duplicates[0]
        );
    }

    let mut columns = base.columns.clone();
    columns.push(note_column.to_string());
    let mut merged = Table::new(columns);

    let notes = index_notes(annotations, schema);
    let key_idx = base.column_index(&schema.key_column);
    if key_idx.is_none() && !base.is_empty() {
        log::warn!(
            "primary data has no {} column, notes cannot be joined",
            schema.key_column
        );
    }

    for row in &base.rows {
        let matches = key_idx
            .and_then(|idx| row.get(idx))
            .and_then(Value::key)
            .and_then(|key| notes.get(&key));

        match matches {
            Some(found) => {
                for note in found {
                    let mut out = row.clone();
                    out.push(Value::Text(note.clone()));
                    merged.push_row(out);
                }
            }
            None => {
                let mut out = row.clone();
                out.push(Value::Text(String::new()));
                merged.push_row(out);
            }
        }
    }

    merged
}

// key -> notes in file order; empty when the expected columns are missing
fn index_notes(annotations: &Table, schema: &Schema) -> HashMap<String, Vec<String>> {
    let mut index: HashMap<String, Vec<String>> = HashMap::new();
    let (Some(key_idx), Some(note_idx)) = (
        annotations.column_index(&schema.key_column),
        annotations.column_index(&schema.annotation_column),
    ) else {
        if !annotations.columns.is_empty() {
            log::warn!(
                "annotations lack {} or {} columns, ignoring them",
                schema.key_column,
                schema.annotation_column
            );
        }
        return index;
    };

    for row in &annotations.rows {
        let Some(key) = row.get(key_idx).and_then(Value::key) else {
            continue;
        };
        let note = row.get(note_idx).map(Value::to_string).unwrap_or_default();
        index.entry(key).or_default().push(note);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> Table {
        let mut table = Table::with_columns(&["Invoice ID", "Total"]);
        table.push_row(vec!["A1".into(), 10.0.into()]);
        table.push_row(vec!["A2".into(), 20.0.into()]);
        table
    }

    fn notes(rows: &[(&str, &str)]) -> Table {
        let mut table = Table::with_columns(&["Invoice ID", "Opmerkingen"]);
        for (id, note) in rows {
            table.push_row(vec![(*id).into(), (*note).into()]);
        }
        table
    }

    #[test]
    fn no_annotations_gives_empty_notes() {
        let merged = merge_annotations(&primary(), &Table::default(), &Schema::default());
        assert_eq!(merged.columns, vec!["Invoice ID", "Total", "Opmerkingen"]);
        assert_eq!(merged.len(), 2);
        assert!(merged.column_values("Opmerkingen").all(|v| *v == Value::from("")));
    }

    #[test]
    fn notes_join_by_key() {
        let merged = merge_annotations(
            &primary(),
            &notes(&[("A2", "call back"), ("ZZ", "orphan")]),
            &Schema::default(),
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.cell(0, "Opmerkingen"), Some(&Value::from("")));
        assert_eq!(merged.cell(1, "Opmerkingen"), Some(&Value::from("call back")));
    }

    #[test]
    fn duplicate_annotations_multiply_rows() {
        let merged = merge_annotations(
            &primary(),
            &notes(&[("A1", "first"), ("A1", "second")]),
            &Schema::default(),
        );
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.cell(0, "Opmerkingen"), Some(&Value::from("first")));
        assert_eq!(merged.cell(1, "Opmerkingen"), Some(&Value::from("second")));
        assert_eq!(merged.cell(2, "Invoice ID"), Some(&Value::from("A2")));
    }

    #[test]
    fn annotations_without_expected_columns_are_ignored() {
        let mut odd = Table::with_columns(&["Invoice ID", "Note"]);
        odd.push_row(vec!["A1".into(), "x".into()]);
        let merged = merge_annotations(&primary(), &odd, &Schema::default());
        assert_eq!(merged.len(), 2);
        assert!(merged.column_values("Opmerkingen").all(Value::is_empty));
    }

    #[test]
    fn existing_note_column_is_replaced() {
        let mut saved = Table::with_columns(&["Invoice ID", "Opmerkingen", "Total"]);
        saved.push_row(vec!["A1".into(), "stale".into(), 10.0.into()]);
        let merged = merge_annotations(&saved, &notes(&[("A1", "fresh")]), &Schema::default());
        assert_eq!(merged.columns, vec!["Invoice ID", "Total", "Opmerkingen"]);
        assert_eq!(merged.cell(0, "Opmerkingen"), Some(&Value::from("fresh")));
    }

    #[test]
    fn numeric_keys_match_text_keys() {
        let mut numeric = Table::with_columns(&["Invoice ID", "Total"]);
        numeric.push_row(vec![1001.0.into(), 5.0.into()]);
        let merged = merge_annotations(&numeric, &notes(&[("1001", "ok")]), &Schema::default());
        assert_eq!(merged.cell(0, "Opmerkingen"), Some(&Value::from("ok")));
    }
}
