//! Plan-document schema and build-matrix assembly for dockforge.
//!
//! [`Planner`] walks the variant matrix and emits one [`TargetSpec`] per
//! target: configuration artifacts, image builds, image tests and the
//! per-variant aggregation shortcuts. The resulting [`PlanDocument`] is the
//! complete description the external task engine consumes; assembly
//! validates it as a DAG with unique task names before handing it over.

mod assembly;
mod error;
mod schema;

pub use assembly::Planner;
pub use error::{Error, Result};
pub use schema::{Action, GenerateStrategy, PLAN_VERSION, PlanDocument, TargetSpec};
