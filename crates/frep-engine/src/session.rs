use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use frep_tree::{Expression, ShapeArchive, ShapeId};

use crate::composite::Compositor;
use crate::config::ViewerConfig;
use crate::input::InputSnapshot;
use crate::render::{Effects, FrameReport, FrameRequest, RenderMode, RenderOrchestrator, ShapeRenderer};
use crate::scene::{SceneSynchronizer, SyncReport, TapeCompiler};
use crate::script::{export_shape, EvalStatus, PersistError, ScriptBuffer, ScriptEvaluator};
use crate::view::{apply_input, ViewState, ViewTransform};

/// State that lives for the whole viewing session.
#[derive(Debug, Clone)]
pub struct Session {
    pub view: ViewState,
    pub mode: RenderMode,
    pub render_size: u32,
    pub script: ScriptBuffer,
    pub status: EvalStatus,
    /// Shapes from the last successful evaluation.
    pub live: BTreeMap<ShapeId, Expression>,
}

impl Session {
    pub fn new(config: &ViewerConfig, script: ScriptBuffer) -> Self {
        Self {
            view: config.view,
            mode: config.mode,
            render_size: config.render_size,
            script,
            status: EvalStatus::Pending,
            live: BTreeMap::new(),
        }
    }
}

/// The external pieces a frame drives.
pub struct Collaborators<'a, V, C, R, E, K> {
    pub evaluator: &'a mut V,
    pub compiler: &'a mut C,
    pub renderer: &'a mut R,
    pub effects: &'a mut E,
    pub compositor: &'a mut K,
}

/// What one call to [`Viewer::frame`] did besides drawing.
#[derive(Debug, Default)]
pub struct FrameOutcome {
    /// Present when the script was re-evaluated successfully.
    pub sync: Option<SyncReport>,
    /// Result of a save request, if one arrived this frame.
    pub saved: Option<Result<PathBuf, String>>,
    pub render: FrameReport,
}

/// Drives one session: input → view → script/scene → render.
pub struct Viewer<T, S> {
    session: Session,
    transform: ViewTransform,
    scene: SceneSynchronizer<T>,
    orchestrator: RenderOrchestrator<S>,
    export_path: PathBuf,
}

impl<T, S> Viewer<T, S> {
    pub fn new(config: &ViewerConfig, script: ScriptBuffer) -> Self {
        Self {
            session: Session::new(config, script),
            transform: ViewTransform::new(config.tuning),
            scene: SceneSynchronizer::new(),
            orchestrator: RenderOrchestrator::new(),
            export_path: config.export_path.clone(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn scene(&self) -> &SceneSynchronizer<T> {
        &self.scene
    }

    pub fn orchestrator(&self) -> &RenderOrchestrator<S> {
        &self.orchestrator
    }

    pub fn frame<V, C, R, E, K>(
        &mut self,
        input: &InputSnapshot,
        collab: Collaborators<'_, V, C, R, E, K>,
    ) -> FrameOutcome
    where
        V: ScriptEvaluator,
        C: TapeCompiler<Tape = T>,
        R: ShapeRenderer<Tape = T, Surface = S>,
        E: Effects<S>,
        K: Compositor<S>,
    {
        let mut outcome = FrameOutcome::default();

        self.session.view = apply_input(&self.transform, &self.session.view, input);

        if let Some(mode) = input.digit_pressed.and_then(RenderMode::from_digit) {
            if mode != self.session.mode {
                log::debug!("render mode {} -> {}", self.session.mode, mode);
                self.session.mode = mode;
            }
        }

        if input.save_requested {
            outcome.saved = Some(self.save_script());
        }

        if self.session.script.take_dirty() {
            outcome.sync = self.reevaluate(collab.evaluator, collab.compiler);
        }

        let request = FrameRequest {
            mode: self.session.mode,
            view: self.session.view,
            size_px: self.session.render_size,
        };
        outcome.render = self.orchestrator.render_frame(
            &request,
            &self.scene,
            collab.renderer,
            collab.effects,
            collab.compositor,
        );

        outcome
    }

    fn save_script(&self) -> Result<PathBuf, String> {
        match self.session.script.save() {
            Ok(path) => Ok(path.to_path_buf()),
            Err(err) => {
                log::warn!("save failed: {err}");
                Err(err.to_string())
            }
        }
    }

    /// Runs the script. On error the previous shapes stay compiled and shown.
    fn reevaluate<V, C>(&mut self, evaluator: &mut V, compiler: &mut C) -> Option<SyncReport>
    where
        V: ScriptEvaluator,
        C: TapeCompiler<Tape = T>,
    {
        let result = evaluator.eval(self.session.script.text());
        self.session.status = EvalStatus::from(&result);

        match result {
            Ok(eval) => {
                self.session.live = eval.shapes;
                let report = self.scene.synchronize(compiler, &self.session.live);
                log::debug!(
                    "scene sync: {} compiled, {} released, {} failed",
                    report.compiled.len(),
                    report.released.len(),
                    report.failed.len()
                );
                Some(report)
            }
            Err(err) => {
                log::info!("script error: {err}");
                None
            }
        }
    }

    /// Writes one live shape to the configured export path.
    pub fn export(&self, id: ShapeId, archive: &dyn ShapeArchive) -> Result<(), PersistError> {
        self.export_to(id, archive, &self.export_path)
    }

    pub fn export_to(
        &self,
        id: ShapeId,
        archive: &dyn ShapeArchive,
        path: &Path,
    ) -> Result<(), PersistError> {
        match self.session.live.get(&id) {
            Some(expr) => export_shape(archive, expr, path),
            None => Err(PersistError::UnknownShape(id)),
        }
    }

    /// Releases every compiled tape.
    pub fn shutdown<C>(&mut self, compiler: &mut C)
    where
        C: TapeCompiler<Tape = T>,
    {
        self.scene.shutdown(compiler);
        self.session.live.clear();
    }
}
