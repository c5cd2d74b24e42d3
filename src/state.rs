use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::cache::StoreCache;
use crate::data::filter::{Criterion, FilterCriteria, FilteredView, filtered_indices, view_from_indices};
use crate::data::model::{CostField, RecordStore};
use crate::data::stats::{GroupMean, Summary, group_mean, summarize};
use crate::error::{DataLoadError, EstimationError};
use crate::estimate::pipeline::{EstimationRequest, EstimationResult, Estimator};

pub type EstimateOutcome = Result<EstimationResult, EstimationError>;

// ---------------------------------------------------------------------------
// Estimation request lifecycle (as seen by the UI)
// ---------------------------------------------------------------------------

pub enum EstimateState {
    Idle,
    /// One request in flight on a worker thread.
    Pending {
        request: EstimationRequest,
        rx: Receiver<EstimateOutcome>,
    },
    Finished {
        request: EstimationRequest,
        outcome: EstimateOutcome,
    },
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    cache: StoreCache,

    /// Loaded dataset (None until a file is loaded).
    pub store: Option<Arc<RecordStore>>,

    /// Region / industry / pollutant selections.
    pub criteria: FilterCriteria,

    /// Indices of records passing the current criteria (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates of the visible records, recomputed on every refilter.
    pub summary: Summary,
    pub region_means: Vec<GroupMean>,
    pub industry_means: Vec<GroupMean>,

    /// Bar colours, stable for the lifetime of a dataset.
    pub region_colors: ColorMap,
    pub industry_colors: ColorMap,

    estimator: Arc<Estimator>,
    /// Free-text industry typed by the user.
    pub estimate_industry: String,
    /// Pollutant chosen from the dataset's values.
    pub estimate_pollutant: Option<String>,
    pub estimate: EstimateState,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(estimator: Estimator) -> Self {
        Self {
            cache: StoreCache::default(),
            store: None,
            criteria: FilterCriteria::unconstrained(),
            visible_indices: Vec::new(),
            summary: Summary::Undefined,
            region_means: Vec::new(),
            industry_means: Vec::new(),
            region_colors: ColorMap::default(),
            industry_colors: ColorMap::default(),
            estimator: Arc::new(estimator),
            estimate_industry: String::new(),
            estimate_pollutant: None,
            estimate: EstimateState::Idle,
            status_message: None,
        }
    }

    /// Load (or re-use) the dataset at `path`. On failure the current
    /// dataset stays in place.
    pub fn load_dataset(&mut self, path: &Path) -> Result<(), DataLoadError> {
        match self.cache.load(path) {
            Ok(store) => {
                let unchanged = self
                    .store
                    .as_ref()
                    .is_some_and(|current| Arc::ptr_eq(current, &store));
                if !unchanged {
                    self.set_dataset(store);
                }
                self.status_message = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Ingest a newly loaded dataset, reset filters and colours.
    pub fn set_dataset(&mut self, store: Arc<RecordStore>) {
        self.criteria = FilterCriteria::unconstrained();
        self.region_colors = ColorMap::new(store.distinct(CostField::Region));
        self.industry_colors = ColorMap::new(store.distinct(CostField::Industry));
        self.estimate_pollutant = store.distinct(CostField::PollutantType).first().cloned();
        self.store = Some(store);
        self.refilter();
    }

    /// Recompute `visible_indices` and aggregates after a criteria change.
    pub fn refilter(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        self.visible_indices = filtered_indices(store, &self.criteria);
        let view = view_from_indices(store, &self.visible_indices);
        self.summary = summarize(&view);
        self.region_means = group_mean(&view, CostField::Region);
        self.industry_means = group_mean(&view, CostField::Industry);
    }

    /// Change one column's criterion and refilter if it differs.
    pub fn set_criterion(&mut self, field: CostField, criterion: Criterion) {
        if *self.criteria.get(field) != criterion {
            *self.criteria.get_mut(field) = criterion;
            self.refilter();
        }
    }

    /// The records currently shown.
    pub fn visible_view(&self) -> FilteredView<'_> {
        match &self.store {
            Some(store) => view_from_indices(store, &self.visible_indices),
            None => FilteredView::default(),
        }
    }

    pub fn is_estimating(&self) -> bool {
        matches!(self.estimate, EstimateState::Pending { .. })
    }

    /// Whether the estimate button should be enabled.
    pub fn can_estimate(&self) -> bool {
        self.store.is_some()
            && !self.is_estimating()
            && !self.estimate_industry.trim().is_empty()
            && self.estimate_pollutant.is_some()
    }

    /// Run one estimation request on a worker thread. Ignored while another
    /// request is pending.
    pub fn start_estimate(&mut self) {
        if !self.can_estimate() {
            return;
        }
        let (Some(store), Some(pollutant)) = (&self.store, &self.estimate_pollutant) else {
            return;
        };

        let request = EstimationRequest::new(self.estimate_industry.trim(), pollutant.clone());
        let store = Arc::clone(store);
        let estimator = Arc::clone(&self.estimator);
        let (tx, rx) = mpsc::channel();
        let worker_request = request.clone();

        std::thread::spawn(move || {
            let outcome = estimator.estimate(&store, &worker_request);
            // The receiver is gone if the window closed meanwhile.
            let _ = tx.send(outcome);
        });

        self.estimate = EstimateState::Pending { request, rx };
    }

    /// Pick up a finished estimate. Returns true when the state changed.
    pub fn poll_estimate(&mut self) -> bool {
        let EstimateState::Pending { rx, .. } = &self.estimate else {
            return false;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(EstimationError::WorkerLost),
        };

        let state = std::mem::replace(&mut self.estimate, EstimateState::Idle);
        if let EstimateState::Pending { request, .. } = state {
            self.estimate = EstimateState::Finished { request, outcome };
        }
        true
    }
}
