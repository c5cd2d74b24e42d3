use std::path::PathBuf;
use std::str::FromStr;

use crate::estimate::pipeline::EmptyContextPolicy;

pub const DEFAULT_BASE_URL: &str = "https://api.moonshot.cn/v1";
pub const DEFAULT_MODEL: &str = "moonshot-v1-8k";
pub const DEFAULT_CONTEXT_MAX_ROWS: usize = 200;

// ---------------------------------------------------------------------------
// Configuration (environment + optional .env)
// ---------------------------------------------------------------------------

/// Where and how to reach the text-generation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Bearer credential; estimation fails with `MissingApiKey` without it.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

/// Estimation pipeline tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// Maximum number of historical rows serialized into the prompt.
    pub context_max_rows: usize,
    pub empty_context: EmptyContextPolicy,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            context_max_rows: DEFAULT_CONTEXT_MAX_ROWS,
            empty_context: EmptyContextPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub estimator: EstimatorConfig,
    /// Dataset opened at startup.
    pub dataset: Option<PathBuf>,
    /// Extra font (e.g. a CJK font) for dataset labels.
    pub font: Option<PathBuf>,
}

impl AppConfig {
    /// Read configuration from the process environment, after loading `.env`
    /// if one is present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let model = ModelConfig {
            api_key: non_empty("LLM_API_KEY"),
            base_url: non_empty("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: non_empty("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        let estimator = EstimatorConfig {
            context_max_rows: context_budget(non_empty("ESTIMATE_CONTEXT_MAX_ROWS")),
            empty_context: parse_or_default(
                "ESTIMATE_EMPTY_CONTEXT",
                non_empty("ESTIMATE_EMPTY_CONTEXT"),
                EmptyContextPolicy::default(),
            ),
        };

        AppConfig {
            model,
            estimator,
            dataset: non_empty("COST_DATASET").map(PathBuf::from),
            font: non_empty("COST_VIEWER_FONT").map(PathBuf::from),
        }
    }
}

/// A budget of zero would send the model no rows at all.
fn context_budget(raw: Option<String>) -> usize {
    match parse_or_default("ESTIMATE_CONTEXT_MAX_ROWS", raw, DEFAULT_CONTEXT_MAX_ROWS) {
        0 => {
            log::warn!("ESTIMATE_CONTEXT_MAX_ROWS must be at least 1, using default");
            DEFAULT_CONTEXT_MAX_ROWS
        }
        n => n,
    }
}

fn parse_or_default<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {key}={raw:?}, using default");
            default
        }),
    }
}
