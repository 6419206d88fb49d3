//! Render orchestration for the frep implicit-surface viewer.
//!
//! The crate turns pointer input into a camera, keeps compiled shapes in step
//! with the script's output, and drives evaluation kernels and post effects
//! into a single display texture. Kernels, effects, the compiler and the
//! script language are reached through traits.

pub mod composite;
pub mod config;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod scene;
pub mod script;
pub mod session;
pub mod view;

pub use config::ViewerConfig;
pub use session::{Collaborators, FrameOutcome, Session, Viewer};
