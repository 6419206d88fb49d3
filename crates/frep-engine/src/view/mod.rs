//! Camera state and the pointer → camera mapping.

mod input;
mod state;
mod transform;

pub use input::apply_input;
pub use state::{planar_matrix, view_matrix, ViewState};
pub use transform::{ViewTransform, ViewTuning};
