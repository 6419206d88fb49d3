use frep_tree::{Expression, ShapeId};
use thiserror::Error;

/// Compilation of one shape failed; other shapes are unaffected.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("shape {id} could not be compiled: {reason}")]
    Rejected { id: ShapeId, reason: String },

    #[error("out of device memory compiling shape {id}")]
    OutOfMemory { id: ShapeId },
}

/// Turns expression trees into device-resident tapes.
///
/// A tape is exclusively owned by whoever holds it. Device memory is only
/// returned through [`TapeCompiler::release`], never by dropping.
pub trait TapeCompiler {
    type Tape;

    fn compile(&mut self, expr: &Expression) -> Result<Self::Tape, CompileError>;

    fn release(&mut self, tape: Self::Tape);
}
