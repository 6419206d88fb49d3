//! Expression trees and shape identities for the frep viewer.
//!
//! A script evaluation produces a set of [`Expression`]s. Each one carries a
//! [`ShapeId`] assigned when it is constructed, so the render layer can track
//! shapes across re-evaluations without looking at tree contents.

mod archive;
mod id;
mod tree;

pub use archive::{ArchiveError, JsonArchive, ShapeArchive, ARCHIVE_FORMAT, ARCHIVE_VERSION};
pub use id::ShapeId;
pub use tree::{BinaryOp, Expression, Tree, UnaryOp};
