//! Script text, its evaluation contract, and persistence.

mod buffer;
mod eval;
mod export;

pub use buffer::{PersistError, ScriptBuffer};
pub use eval::{EvalStatus, Evaluation, ScriptError, ScriptEvaluator};
pub use export::export_shape;
