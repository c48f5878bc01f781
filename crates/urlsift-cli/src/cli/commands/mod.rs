//! CLI command handlers, one file per command.

mod features;
mod predict;
mod response;
mod serve;
mod train;

pub use features::run_features;
pub use predict::run_predict;
pub use response::PredictionResponse;
pub use serve::run_serve;
pub use train::run_train;
