use std::collections::BTreeMap;

use frep_tree::{Expression, ShapeId};
use thiserror::Error;

/// Script could not be evaluated. The previous shapes stay on screen.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScriptError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("{0}")]
    Runtime(String),
}

/// Result of a successful evaluation.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Every shape the script produced, keyed by identity.
    pub shapes: BTreeMap<ShapeId, Expression>,
    /// Printable value of the script's last expression.
    pub result: String,
}

impl Evaluation {
    pub fn from_shapes(shapes: impl IntoIterator<Item = Expression>, result: impl Into<String>) -> Self {
        Self {
            shapes: shapes.into_iter().map(|e| (e.id(), e)).collect(),
            result: result.into(),
        }
    }
}

/// Runs viewer scripts.
pub trait ScriptEvaluator {
    fn eval(&mut self, source: &str) -> Result<Evaluation, ScriptError>;
}

/// What the script panel shows after the last evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalStatus {
    /// Nothing evaluated yet.
    Pending,
    Valid { result: String },
    Error { message: String },
}

impl EvalStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, EvalStatus::Valid { .. })
    }

    /// Single line for the status bar.
    pub fn summary(&self) -> String {
        match self {
            EvalStatus::Pending => String::new(),
            EvalStatus::Valid { result } => result.clone(),
            EvalStatus::Error { message } => format!("error: {message}"),
        }
    }
}

impl From<&Result<Evaluation, ScriptError>> for EvalStatus {
    fn from(r: &Result<Evaluation, ScriptError>) -> Self {
        match r {
            Ok(eval) => EvalStatus::Valid {
                result: eval.result.clone(),
            },
            Err(err) => EvalStatus::Error {
                message: err.to_string(),
            },
        }
    }
}
