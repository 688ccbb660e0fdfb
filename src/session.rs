use crate::cache::ViewCache;
use crate::config::Config;
use crate::error::Result;
use crate::grid::{ColumnKinds, GridOptions, GridPayload, GridSnapshot};
use crate::merge::merge_annotations;
use crate::persist::{self, SaveReport, SaveState};
use crate::storage::Storage;
use crate::summary::Summary;
use crate::table::Table;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;

pub const TITLE: &str = "Supermarkt Verkopen Dashboard";

/// Per-session state: the cached view, the last update time and the save state.
#[derive(Debug)]
pub struct Session {
    cache: ViewCache,
    last_update: DateTime<Local>,
    save_state: SaveState,
}

impl Session {
    pub fn new(cache_ttl: Duration) -> Self {
        Session {
            cache: ViewCache::new(cache_ttl),
            last_update: Local::now(),
            save_state: SaveState::Idle,
        }
    }

    pub fn last_update(&self) -> DateTime<Local> {
        self.last_update
    }

    pub fn save_state(&self) -> SaveState {
        self.save_state
    }

    pub fn cache(&self) -> &ViewCache {
        &self.cache
    }
}

/// Storage, configuration and session wired together: the whole dashboard
/// minus the HTTP layer.
#[derive(Debug)]
pub struct Dashboard {
    config: Config,
    storage: Storage,
    session: Session,
}

impl Dashboard {
    pub fn new(config: Config) -> Self {
        let storage = Storage::from_config(&config);
        let session = Session::new(config.cache_ttl());
        Dashboard {
            config,
            storage,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The merged view, from cache when fresh, else loaded and merged from disk.
    pub fn view(&mut self) -> Result<Arc<Table>> {
        let storage = &self.storage;
        let schema = &self.config.schema;
        self.session.cache.get_or_load(|| {
            let primary = storage.load_primary()?;
            let annotations = storage.load_annotations()?;
            Ok(merge_annotations(&primary, &annotations, schema))
        })
    }

    pub fn invalidate(&mut self) {
        self.session.cache.invalidate();
    }

    /// Everything the page renders. A load failure becomes an error payload
    /// without data; nothing is retried.
    pub fn payload(&mut self) -> GridPayload {
        let last_update = self.session.last_update.to_rfc3339();
        match self.view() {
            Ok(view) => GridPayload {
                status: "ok".to_string(),
                title: TITLE.to_string(),
                message: None,
                options: Some(GridOptions::for_table(
                    &view,
                    &self.config.schema,
                    &self.config.grid,
                )),
                columns: view.columns.clone(),
                rows: view.rows.clone(),
                metrics: Summary::of(&view, &self.config.schema).metrics(),
                last_update,
            },
            Err(e) => {
                log::error!("loading dashboard data failed: {}", e);
                GridPayload {
                    status: "error".to_string(),
                    title: TITLE.to_string(),
                    message: Some(format!("Error bij het inladen van het bestand: {}", e)),
                    options: None,
                    columns: Vec::new(),
                    rows: Vec::new(),
                    metrics: Vec::new(),
                    last_update,
                }
            }
        }
    }

    /// Persists the grid snapshot: primary and annotations are rewritten,
    /// the cache is dropped and the last update time moves forward.
    ///
    /// Cells are typed back after the view the page was served, so columns
    /// keep their types across the save.
    pub fn save(&mut self, snapshot: GridSnapshot) -> Result<SaveReport> {
        let kinds = match self.view() {
            Ok(view) => ColumnKinds::of(&view),
            Err(e) => {
                log::warn!("no view to type the snapshot against: {}", e);
                ColumnKinds::default()
            }
        };
        let table = snapshot.into_table(&self.config.schema, &kinds);
        self.save_table(&table)
    }

    pub fn save_table(&mut self, table: &Table) -> Result<SaveReport> {
        self.session.save_state.begin()?;
        let written = persist::write_snapshot(&self.storage, table, &self.config.schema);
        self.session.save_state.finish();

        let saved_annotations = written.inspect_err(|e| log::error!("save failed: {}", e))?;
        self.session.cache.invalidate();
        self.session.last_update = Local::now();
        log::info!(
            "saved {} records with {} annotations",
            table.len(),
            saved_annotations.len()
        );

        Ok(SaveReport {
            saved_annotations,
            record_count: table.len(),
            saved_at: self.session.last_update,
        })
    }
}
