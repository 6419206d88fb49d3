//! Compiled shape set.
//!
//! The scene owns one tape per live shape identity and reconciles that set
//! against whatever the script last produced.

mod compiler;
mod shape;
mod sync;

pub use compiler::{CompileError, TapeCompiler};
pub use shape::SceneShape;
pub use sync::{SceneSynchronizer, SyncReport};
