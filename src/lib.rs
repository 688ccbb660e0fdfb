/*!
# Supermarkt Verkopen Dashboard

A single-page viewer/editor for a sales dataset kept in a spreadsheet file.

## Overview

The dashboard loads the primary sales records, left-joins a second
"annotations" file onto them by `Invoice ID`, and shows the merged table in a
browser grid. Every column is read-only except `Opmerkingen`, a free-text note
edited in a popup text area. Saving writes the whole grid back as the new
primary file and the non-empty notes as the new annotations file.

## Architecture

Data flows in one direction and back:

```text
storage (load) -> merge -> cache -> grid -> page
page (edits) -> persist -> storage (write) -> cache invalidation -> re-render
```

### Library
- **table**: flat `Table` of typed `Value` cells
- **loader** / **downloader**: CSV and workbook readers and writers
- **storage**: the two files, whole-file atomic rewrites
- **merge**: left join of notes onto records
- **cache**: time-boxed memo of the merged view
- **grid**: declarative column configuration and the snapshot read back from the page
- **persist**: annotation extraction and the save state machine
- **summary**: record count, column count and sales total
- **session**: per-session context and the `Dashboard` facade
- **config**: defaults plus an optional JSON config file
- **error**: `DashboardError`

### Web layer (`web` feature)
- **app**: axum router, `GET /`, `GET /api/grid`, `POST /api/save`

## Files

- `supermarkt_sales.xlsx`: primary records, needs `Invoice ID` and `Total`
- `opmerkingen.xlsx`: `Invoice ID` + `Opmerkingen`, created on the first save
*/

pub mod cache;
pub mod config;
pub mod downloader;
pub mod error;
pub mod grid;
pub mod loader;
pub mod merge;
pub mod persist;
pub mod session;
pub mod storage;
pub mod summary;
pub mod table;

#[cfg(feature = "web")]
pub mod app;

pub use cache::ViewCache;
pub use config::{Config, GridSettings, Schema};
pub use error::{DashboardError, Result};
pub use grid::{ColumnKind, ColumnKinds, GridOptions, GridPayload, GridSnapshot};
pub use merge::merge_annotations;
pub use persist::{SaveReport, SaveState, derive_annotations};
pub use session::{Dashboard, Session};
pub use storage::Storage;
pub use summary::{Summary, format_euro};
pub use table::{Table, Value};
