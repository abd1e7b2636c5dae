mod group;
mod results_db;
mod schema;

// Re-exports.
pub use group::{ExperimentGroup, Run};
pub use results_db::ResultsDB;
pub use schema::Schema;
