/// Grounded estimation: retrieve matching history, then ask a model.
///
/// ```text
///   RecordStore ──► context::select_by_pollutant   (substring match)
///                          │
///                          ▼
///                   context::build_context          (bounded text block)
///                          │
///                          ▼
///                   prompt::build_messages         (system + user)
///                          │
///                          ▼
///                   client::ChatModel::complete    (one call, T = 0.1)
///                          │
///                          ▼
///                   EstimationResult / EstimationError
/// ```

pub mod client;
pub mod context;
pub mod pipeline;
pub mod prompt;
