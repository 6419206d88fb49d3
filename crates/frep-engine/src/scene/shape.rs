use frep_tree::{Expression, ShapeId};

/// A live shape with its compiled tape.
#[derive(Debug)]
pub struct SceneShape<T> {
    expression: Expression,
    tape: T,
}

impl<T> SceneShape<T> {
    pub(super) fn new(expression: Expression, tape: T) -> Self {
        Self { expression, tape }
    }

    #[inline]
    pub fn id(&self) -> ShapeId {
        self.expression.id()
    }

    #[inline]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    #[inline]
    pub fn tape(&self) -> &T {
        &self.tape
    }

    pub(super) fn into_tape(self) -> T {
        self.tape
    }
}
