use crate::config::{GridSettings, Schema};
use crate::summary::Metric;
use crate::table::{Table, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregation applied to a column when rows are grouped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pinned {
    Left,
    Right,
}

/// How a cell is edited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CellEditor {
    None,
    Text,
    /// Multi-line text area, optionally shown in a popup over the grid.
    MultilineText { popup: bool },
}

/// Declarative configuration of one grid column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub field: String,
    pub header_name: String,
    pub editable: bool,
    pub groupable: bool,
    pub sortable: bool,
    pub resizable: bool,
    pub width: u32,
    pub aggregation: Option<Aggregation>,
    pub pinned: Option<Pinned>,
    pub editor: CellEditor,
    pub wrap_text: bool,
}

impl ColumnConfig {
    /// A read-only data column: groupable, sortable, resizable, summed when grouped.
    pub fn data(field: &str, width: u32) -> Self {
        ColumnConfig {
            field: field.to_string(),
            header_name: field.to_string(),
            editable: false,
            groupable: true,
            sortable: true,
            resizable: true,
            width,
            aggregation: Some(Aggregation::Sum),
            pinned: None,
            editor: CellEditor::None,
            wrap_text: false,
        }
    }

    /// The note column: the only editable one, pinned right, popup multi-line editor.
    pub fn annotation(field: &str, width: u32) -> Self {
        ColumnConfig {
            field: field.to_string(),
            header_name: field.to_string(),
            editable: true,
            groupable: false,
            sortable: true,
            resizable: true,
            width,
            aggregation: None,
            pinned: Some(Pinned::Right),
            editor: CellEditor::MultilineText { popup: true },
            wrap_text: true,
        }
    }
}

/// Row shading, purely visual.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowStriping {
    /// Background of rows with an even (0-based) index.
    pub even_background: String,
}

/// Everything the page needs to lay out the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    pub columns: Vec<ColumnConfig>,
    pub pagination: bool,
    pub side_bar: bool,
    pub row_striping: RowStriping,
}

impl GridOptions {
    pub fn for_table(table: &Table, schema: &Schema, settings: &GridSettings) -> Self {
        let note = schema.annotation_column.as_str();
        let mut columns: Vec<ColumnConfig> = table
            .columns
            .iter()
            .filter(|name| name.as_str() != note)
            .map(|name| ColumnConfig::data(name, settings.column_width))
            .collect();
        columns.push(ColumnConfig::annotation(note, settings.annotation_width));

        GridOptions {
            columns,
            pagination: false,
            side_bar: true,
            row_striping: RowStriping {
                even_background: settings.stripe_color.clone(),
            },
        }
    }

    pub fn column(&self, field: &str) -> Option<&ColumnConfig> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn editable_fields(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.editable)
            .map(|c| c.field.as_str())
            .collect()
    }
}

/// The grid contents as displayed (filtered, sorted, edited), sent back by the page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl GridSnapshot {
    pub fn from_table(table: &Table) -> Self {
        let rows = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| serde_json::to_value(v).unwrap_or(serde_json::Value::Null))
                    .collect()
            })
            .collect();
        GridSnapshot {
            columns: table.columns.clone(),
            rows,
        }
    }

    /// Converts the page's JSON cells back to table values.
    ///
    /// JSON has no date type, so `kinds` carries the cell types of the view
    /// that was served: strings become dates only in date columns, empty
    /// strings become empty cells only outside text columns. Notes are
    /// always text.
    pub fn into_table(self, schema: &Schema, kinds: &ColumnKinds) -> Table {
        let column_kinds: Vec<ColumnKind> = self
            .columns
            .iter()
            .map(|name| {
                if *name == schema.annotation_column {
                    ColumnKind::Note
                } else {
                    kinds.kind(name)
                }
            })
            .collect();
        let width = self.columns.len();
        let mut table = Table::new(self.columns);
        for mut row in self.rows {
            row.resize(width, serde_json::Value::Null);
            let cells = row
                .into_iter()
                .zip(&column_kinds)
                .map(|(cell, kind)| from_json(cell, *kind))
                .collect();
            table.push_row(cells);
        }
        table
    }
}

/// Cell type of a column, as far as the JSON read-back needs to know.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// The editable annotation column.
    Note,
    /// At least one text cell.
    Text,
    /// Dates and empty cells only.
    Date,
    /// Numbers, booleans, or nothing at all.
    Other,
}

impl ColumnKind {
    fn of<'a>(values: impl Iterator<Item = &'a Value>) -> Self {
        let mut kind = ColumnKind::Other;
        for value in values {
            match value {
                Value::Text(_) => return ColumnKind::Text,
                Value::DateTime(_) => kind = ColumnKind::Date,
                _ => {}
            }
        }
        kind
    }
}

/// Column kinds of a served view, keyed by column name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnKinds {
    kinds: HashMap<String, ColumnKind>,
}

impl ColumnKinds {
    pub fn of(table: &Table) -> Self {
        let kinds = table
            .columns
            .iter()
            .map(|name| (name.clone(), ColumnKind::of(table.column_values(name))))
            .collect();
        ColumnKinds { kinds }
    }

    /// Columns the view did not have are `Other`: their strings stay text.
    pub fn kind(&self, column: &str) -> ColumnKind {
        self.kinds.get(column).copied().unwrap_or(ColumnKind::Other)
    }
}

fn from_json(cell: serde_json::Value, kind: ColumnKind) -> Value {
    use serde_json::Value as Json;
    let is_note = kind == ColumnKind::Note;
    match cell {
        Json::Null if is_note => Value::Text(String::new()),
        Json::Null => Value::Empty,
        Json::String(s) if is_note || kind == ColumnKind::Text => Value::Text(s),
        Json::String(s) if s.is_empty() => Value::Empty,
        Json::String(s) if kind == ColumnKind::Date => {
            Value::parse_datetime(&s).unwrap_or(Value::Text(s))
        }
        Json::String(s) => Value::Text(s),
        Json::Bool(b) if is_note => Value::Text(b.to_string()),
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) if is_note => Value::Text(n.to_string()),
        Json::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Empty),
        other => Value::Text(other.to_string()),
    }
}

/// Response body of the grid endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPayload {
    pub status: String,
    pub title: String,
    pub message: Option<String>,
    pub options: Option<GridOptions>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub metrics: Vec<Metric>,
    pub last_update: String,
}
