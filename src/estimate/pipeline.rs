use std::fmt;
use std::str::FromStr;

use super::client::ChatModel;
use super::context::{build_context, select_by_pollutant};
use super::prompt::build_messages;
use crate::config::EstimatorConfig;
use crate::data::model::RecordStore;
use crate::error::EstimationError;

/// Sampling temperature for every estimate: low, for conservative and
/// repeatable answers.
pub const TEMPERATURE: f64 = 0.1;

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimationRequest {
    /// Free text; need not appear in the dataset.
    pub industry: String,
    /// Normally one of the store's pollutant types.
    pub pollutant: String,
}

impl EstimationRequest {
    pub fn new(industry: impl Into<String>, pollutant: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            pollutant: pollutant.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstimationResult {
    /// The model's reply, untouched.
    Narrative {
        text: String,
        /// Historical rows that matched the pollutant.
        matched_records: usize,
    },
    /// No historical row matched and the policy forbids ungrounded answers.
    NoHistoricalBasis,
}

/// What to do when no record matches the requested pollutant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyContextPolicy {
    /// Ask the model anyway, with an empty context.
    #[default]
    Invoke,
    /// Return [`EstimationResult::NoHistoricalBasis`] without calling out.
    ShortCircuit,
}

impl FromStr for EmptyContextPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "invoke" => Ok(EmptyContextPolicy::Invoke),
            "short-circuit" | "short_circuit" | "shortcircuit" => {
                Ok(EmptyContextPolicy::ShortCircuit)
            }
            other => Err(format!("unknown empty-context policy '{other}'")),
        }
    }
}

/// Progress of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Selecting,
    ContextBuilt,
    Invoking,
    Completed,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Selecting => "selecting",
            Stage::ContextBuilt => "context-built",
            Stage::Invoking => "invoking",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

/// Grounded estimation: pick matching history, build the prompt, ask the
/// model once.
pub struct Estimator {
    model: Box<dyn ChatModel + Send + Sync>,
    config: EstimatorConfig,
}

impl Estimator {
    pub fn new(model: impl ChatModel + Send + Sync + 'static, config: EstimatorConfig) -> Self {
        Self {
            model: Box::new(model),
            config,
        }
    }

    pub fn estimate(
        &self,
        store: &RecordStore,
        request: &EstimationRequest,
    ) -> Result<EstimationResult, EstimationError> {
        self.estimate_traced(store, request, |_| {})
    }

    /// Like [`estimate`](Self::estimate), reporting each stage transition to
    /// `on_stage`.
    pub fn estimate_traced(
        &self,
        store: &RecordStore,
        request: &EstimationRequest,
        mut on_stage: impl FnMut(Stage),
    ) -> Result<EstimationResult, EstimationError> {
        let mut enter = |stage: Stage| {
            log::debug!(
                "estimate [{} / {}]: {stage}",
                request.industry,
                request.pollutant
            );
            on_stage(stage);
        };

        enter(Stage::Idle);
        enter(Stage::Selecting);
        let matches = select_by_pollutant(store, &request.pollutant);
        let context = build_context(&matches, self.config.context_max_rows);
        enter(Stage::ContextBuilt);

        if context.is_empty() && self.config.empty_context == EmptyContextPolicy::ShortCircuit {
            log::info!(
                "No historical records for pollutant {:?}; not invoking the model",
                request.pollutant
            );
            enter(Stage::Completed);
            return Ok(EstimationResult::NoHistoricalBasis);
        }
        if context.is_truncated() {
            log::debug!(
                "Context truncated to {} of {} rows",
                context.rows_included,
                context.rows_matched
            );
        }

        let messages = build_messages(&context, &request.industry, &request.pollutant);
        enter(Stage::Invoking);
        match self.model.complete(&messages, TEMPERATURE) {
            Ok(text) => {
                log::info!(
                    "Estimate for {} / {} from {} ({} grounding rows)",
                    request.industry,
                    request.pollutant,
                    self.model.model_id(),
                    context.rows_matched
                );
                enter(Stage::Completed);
                Ok(EstimationResult::Narrative {
                    text,
                    matched_records: context.rows_matched,
                })
            }
            Err(e) => {
                log::error!("Estimation failed: {e}");
                enter(Stage::Failed);
                Err(e)
            }
        }
    }
}
