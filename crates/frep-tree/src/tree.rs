use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ShapeId;

/// Unary operators understood by the tape compiler.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Abs,
    Square,
    Sqrt,
    Sin,
    Cos,
    Exp,
    Ln,
}

/// Binary operators understood by the tape compiler.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    Pow,
}

/// Implicit-surface expression over the X/Y/Z coordinates.
///
/// Negative values are inside the shape. The viewer treats trees as opaque
/// payloads; only the compiler and the archive look inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tree {
    X,
    Y,
    Z,
    Const(f32),
    Unary {
        op: UnaryOp,
        arg: Box<Tree>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Tree>,
        rhs: Box<Tree>,
    },
}

impl Tree {
    #[inline]
    pub fn x() -> Self {
        Tree::X
    }

    #[inline]
    pub fn y() -> Self {
        Tree::Y
    }

    #[inline]
    pub fn z() -> Self {
        Tree::Z
    }

    #[inline]
    pub fn constant(v: f32) -> Self {
        Tree::Const(v)
    }

    pub fn unary(op: UnaryOp, arg: Tree) -> Self {
        Tree::Unary { op, arg: Box::new(arg) }
    }

    pub fn binary(op: BinaryOp, lhs: Tree, rhs: Tree) -> Self {
        Tree::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn square(self) -> Self {
        Tree::unary(UnaryOp::Square, self)
    }

    pub fn sqrt(self) -> Self {
        Tree::unary(UnaryOp::Sqrt, self)
    }

    pub fn abs(self) -> Self {
        Tree::unary(UnaryOp::Abs, self)
    }

    pub fn min(self, other: Tree) -> Self {
        Tree::binary(BinaryOp::Min, self, other)
    }

    pub fn max(self, other: Tree) -> Self {
        Tree::binary(BinaryOp::Max, self, other)
    }

    /// Sphere of radius `r` centered at `(cx, cy, cz)`.
    pub fn sphere(r: f32, cx: f32, cy: f32, cz: f32) -> Self {
        ((Tree::X - cx).square() + (Tree::Y - cy).square() + (Tree::Z - cz).square()).sqrt() - r
    }

    /// Circle of radius `r` in the XY plane, centered at `(cx, cy)`.
    pub fn circle(r: f32, cx: f32, cy: f32) -> Self {
        ((Tree::X - cx).square() + (Tree::Y - cy).square()).sqrt() - r
    }

    /// First NaN or infinite constant in the tree, if any.
    pub fn non_finite_constant(&self) -> Option<f32> {
        match self {
            Tree::Const(v) if !v.is_finite() => Some(*v),
            Tree::X | Tree::Y | Tree::Z | Tree::Const(_) => None,
            Tree::Unary { arg, .. } => arg.non_finite_constant(),
            Tree::Binary { lhs, rhs, .. } => {
                lhs.non_finite_constant().or_else(|| rhs.non_finite_constant())
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Tree::X | Tree::Y | Tree::Z | Tree::Const(_) => 1,
            Tree::Unary { arg, .. } => 1 + arg.node_count(),
            Tree::Binary { lhs, rhs, .. } => 1 + lhs.node_count() + rhs.node_count(),
        }
    }
}

impl Add for Tree {
    type Output = Tree;
    fn add(self, rhs: Tree) -> Tree {
        Tree::binary(BinaryOp::Add, self, rhs)
    }
}

impl Sub for Tree {
    type Output = Tree;
    fn sub(self, rhs: Tree) -> Tree {
        Tree::binary(BinaryOp::Sub, self, rhs)
    }
}

impl Mul for Tree {
    type Output = Tree;
    fn mul(self, rhs: Tree) -> Tree {
        Tree::binary(BinaryOp::Mul, self, rhs)
    }
}

impl Div for Tree {
    type Output = Tree;
    fn div(self, rhs: Tree) -> Tree {
        Tree::binary(BinaryOp::Div, self, rhs)
    }
}

impl Add<f32> for Tree {
    type Output = Tree;
    fn add(self, rhs: f32) -> Tree {
        self + Tree::Const(rhs)
    }
}

impl Sub<f32> for Tree {
    type Output = Tree;
    fn sub(self, rhs: f32) -> Tree {
        self - Tree::Const(rhs)
    }
}

impl Mul<f32> for Tree {
    type Output = Tree;
    fn mul(self, rhs: f32) -> Tree {
        self * Tree::Const(rhs)
    }
}

impl Neg for Tree {
    type Output = Tree;
    fn neg(self) -> Tree {
        Tree::unary(UnaryOp::Neg, self)
    }
}

/// A tree bound to the identity it was created with.
///
/// Cloning an `Expression` shares the tree and keeps the identity; building a
/// new one from the same tree yields a different identity.
#[derive(Debug, Clone)]
pub struct Expression {
    id: ShapeId,
    tree: Arc<Tree>,
}

impl Expression {
    pub fn new(tree: Tree) -> Self {
        Self {
            id: ShapeId::next(),
            tree: Arc::new(tree),
        }
    }

    #[inline]
    pub fn id(&self) -> ShapeId {
        self.id
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}
