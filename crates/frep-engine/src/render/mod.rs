//! Per-frame rendering of the compiled shape set.
//!
//! Evaluation kernels and post effects are reached through [`ShapeRenderer`]
//! and [`Effects`]; this module decides what to call, in which order, and how
//! each result is composited.

mod backend;
mod mode;
mod orchestrator;
mod plan;
mod report;
mod surface;

pub use backend::{Effects, RenderError, ShapeRenderer};
pub use mode::RenderMode;
pub use orchestrator::{FrameCompositeState, FrameRequest, RenderOrchestrator};
pub use plan::{plan_frame, PostEffect, RenderPlan, ShapeDraw, ShapeTransform};
pub use report::{FrameReport, ShapeFailure, ShapeTiming, Stage, StageTiming};
pub use surface::RenderSurface;
