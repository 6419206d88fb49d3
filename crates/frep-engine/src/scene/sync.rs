use std::collections::BTreeMap;

use frep_tree::{Expression, ShapeId};

use super::{CompileError, SceneShape, TapeCompiler};

/// Outcome of one [`SceneSynchronizer::synchronize`] call.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub compiled: Vec<ShapeId>,
    pub released: Vec<ShapeId>,
    pub failed: Vec<(ShapeId, CompileError)>,
}

impl SyncReport {
    /// True when the call neither compiled nor released anything.
    pub fn is_noop(&self) -> bool {
        self.compiled.is_empty() && self.released.is_empty() && self.failed.is_empty()
    }
}

/// Keeps the compiled shape set in step with the live expression set.
///
/// Shapes are keyed by identity only. An identity that stays live keeps its
/// tape even if the expression behind it changed.
#[derive(Debug)]
pub struct SceneSynchronizer<T> {
    shapes: BTreeMap<ShapeId, SceneShape<T>>,
}

impl<T> Default for SceneSynchronizer<T> {
    fn default() -> Self {
        Self {
            shapes: BTreeMap::new(),
        }
    }
}

impl<T> SceneSynchronizer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases shapes no longer live, then compiles newly live ones.
    ///
    /// A failed compile is reported and leaves that identity absent; because it
    /// is still live, the next call tries again.
    pub fn synchronize<C>(
        &mut self,
        compiler: &mut C,
        live: &BTreeMap<ShapeId, Expression>,
    ) -> SyncReport
    where
        C: TapeCompiler<Tape = T>,
    {
        let mut report = SyncReport::default();

        let gone: Vec<ShapeId> = self
            .shapes
            .keys()
            .filter(|id| !live.contains_key(id))
            .copied()
            .collect();

        for id in gone {
            if let Some(shape) = self.shapes.remove(&id) {
                compiler.release(shape.into_tape());
                log::debug!("released {id}");
                report.released.push(id);
            }
        }

        for (id, expr) in live {
            if self.shapes.contains_key(id) {
                continue;
            }
            match compiler.compile(expr) {
                Ok(tape) => {
                    self.shapes.insert(*id, SceneShape::new(expr.clone(), tape));
                    log::debug!("compiled {id}");
                    report.compiled.push(*id);
                }
                Err(err) => {
                    log::warn!("{err}");
                    report.failed.push((*id, err));
                }
            }
        }

        report
    }

    /// Releases every remaining tape.
    pub fn shutdown<C>(&mut self, compiler: &mut C)
    where
        C: TapeCompiler<Tape = T>,
    {
        let shapes = std::mem::take(&mut self.shapes);
        for (id, shape) in shapes {
            compiler.release(shape.into_tape());
            log::debug!("released {id} at shutdown");
        }
    }

    /// Compiled shapes in identity order.
    pub fn shapes(&self) -> impl Iterator<Item = &SceneShape<T>> {
        self.shapes.values()
    }

    pub fn get(&self, id: ShapeId) -> Option<&SceneShape<T>> {
        self.shapes.get(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
