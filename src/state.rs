use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::config::DashboardConfig;
use crate::data::error::TableKind;
use crate::data::loader::Loader;
use crate::data::model::{Dataset, Dimension, Selection};
use crate::data::query::{evaluate, DashboardView};
use crate::data::source::SourceLocation;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where the tables come from; edited by "open local file".
    pub config: DashboardConfig,

    /// Loaded tables (None until a load succeeds).
    pub dataset: Option<Dataset>,

    /// Current dropdown values.
    pub selection: Selection,

    /// Result of evaluating `selection` against `dataset` (cached).
    pub view: Option<DashboardView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Result of the load running on a background thread, if any.
    pending: Option<Receiver<anyhow::Result<Dataset>>>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            selection: Selection::default(),
            view: None,
            status_message: None,
            pending: None,
        }
    }

    /// Start (re)loading both tables on a background thread. The current
    /// dataset stays on screen until [`AppState::poll_load`] picks up the
    /// result; a newer reload supersedes an older one.
    pub fn reload(&mut self) {
        let (tx, rx) = mpsc::channel();
        let config = self.config.clone();
        thread::spawn(move || {
            let loaded = Loader::new(&config).and_then(|loader| Ok(loader.load()?));
            // A superseded load has nobody listening.
            let _ = tx.send(loaded);
        });
        self.pending = Some(rx);
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply a finished background load. Returns whether one was applied.
    /// On failure the previous dataset is kept and the error is shown.
    pub fn poll_load(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let loaded = match rx.try_recv() {
            Ok(loaded) => loaded,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                Err(anyhow::anyhow!("load thread exited without a result"))
            }
        };
        self.pending = None;

        match loaded {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load data: {e:#}");
                self.status_message = Some(format!("Erro: {e:#}"));
            }
        }
        true
    }

    /// Point one table at a local file and reload.
    pub fn open_local(&mut self, table: TableKind, path: PathBuf) {
        let location = SourceLocation::File(path);
        match table {
            TableKind::Headcount => self.config.headcount_source = location,
            TableKind::Pipeline => self.config.pipeline_source = location,
        }
        self.reload();
    }

    /// Ingest a newly loaded dataset, keeping the selection where it still
    /// makes sense.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Change one dropdown and recompute.
    pub fn set_filter(&mut self, dim: Dimension, value: Option<String>) {
        if self.selection.set(dim, value) {
            self.refresh();
        }
    }

    pub fn clear_filters(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.refresh();
        }
    }

    /// Recompute the view for the current selection.
    ///
    /// A dropdown value that the recomputed options no longer offer is
    /// cleared and the view recomputed; each pass clears at least one value,
    /// so this settles within six passes.
    pub fn refresh(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.view = None;
            return;
        };

        loop {
            match evaluate(dataset, &self.selection) {
                Ok(view) => {
                    if retain_available(&mut self.selection, &view) {
                        continue;
                    }
                    self.view = Some(view);
                    return;
                }
                Err(e) => {
                    log::error!("Failed to compute dashboard: {e}");
                    self.status_message = Some(format!("Erro: {e}"));
                    self.view = None;
                    return;
                }
            }
        }
    }
}

/// Drop selected values that `view` does not offer. Returns whether anything
/// was dropped.
fn retain_available(selection: &mut Selection, view: &DashboardView) -> bool {
    let stale: Vec<Dimension> = selection
        .active()
        .filter(|(dim, value)| {
            let offered = match dim {
                Dimension::Company => view.company_options.as_slice(),
                _ => view.options.get(*dim),
            };
            !offered.iter().any(|o| o == value)
        })
        .map(|(dim, _)| dim)
        .collect();

    for dim in &stale {
        log::debug!("Clearing {dim} filter: no longer offered");
        selection.set(*dim, None);
    }
    !stale.is_empty()
}
