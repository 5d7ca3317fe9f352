//! The active scalar: a primal value paired with its vertex on the graph.

use std::fmt::{self, Display};

use crate::float::Float;
use crate::graph::{self, GraphThreadLocal, VertexId};

/// Recording scalar for reverse-mode AD with one-sweep Hessians.
///
/// Just a value and a vertex id: `Copy`, 12 bytes over `f64`; the graph
/// lives in a thread-local, not inside this struct, and copying a scalar
/// never duplicates its vertex. Every arithmetic operation on an `Active`
/// appends one vertex to the current graph (division appends two).
#[derive(Clone, Copy, Debug)]
pub struct Active<F: Float> {
    pub(crate) value: F,
    pub(crate) id: VertexId,
}

impl<F: Float + GraphThreadLocal> Active<F> {
    /// Create an independent variable: a leaf vertex on the current graph.
    ///
    /// Panics if no graph is installed on this thread.
    pub fn new(value: F) -> Self {
        graph::with_active_graph(|g| g.leaf(value))
    }
}

impl<F: Float> Active<F> {
    /// The primal value.
    #[inline]
    pub fn value(&self) -> F {
        self.value
    }

    /// The id of this scalar's vertex (for advanced usage / testing).
    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }
}

impl<F: Float> Display for Active<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Append a vertex for `f(x)` with first-order weight `w = f'` and local
/// curvature `so_w = f''`.
#[inline]
pub(crate) fn unary<F: Float + GraphThreadLocal>(
    x: Active<F>,
    value: F,
    w: F,
    so_w: F,
) -> Active<F> {
    graph::with_active_graph(|g| {
        let out = g.leaf(value);
        g.add_unary_edge(out, x, w, so_w);
        out
    })
}

/// Append a vertex for `f(x, y)` with first-order weights `w1`, `w2` and
/// mixed curvature `so_w = ∂²f/∂x∂y`.
#[inline]
pub(crate) fn binary<F: Float + GraphThreadLocal>(
    x: Active<F>,
    y: Active<F>,
    value: F,
    w1: F,
    w2: F,
    so_w: F,
) -> Active<F> {
    graph::with_active_graph(|g| {
        let out = g.leaf(value);
        g.add_binary_edge(out, x, y, w1, w2, so_w);
        out
    })
}

impl<F: Float + GraphThreadLocal> Active<F> {
    /// Reciprocal, `1/x`.
    pub fn recip(self) -> Self {
        let inv = F::one() / self.value;
        let inv_sq = inv * inv;
        let inv_cu = inv_sq * inv;
        unary(self, inv, -inv_sq, inv_cu + inv_cu)
    }

    /// Square root.
    pub fn sqrt(self) -> Self {
        let s = self.value.sqrt();
        let two = F::one() + F::one();
        let d = F::one() / (two * s);
        unary(self, s, d, -d / (two * self.value))
    }

    /// Raise to a constant power `a`.
    pub fn powf(self, a: F) -> Self {
        let x = self.value;
        unary(
            self,
            x.powf(a),
            a * x.powf(a - F::one()),
            a * (a - F::one()) * x.powf(a - F::one() - F::one()),
        )
    }

    /// Raise to a constant integer power `n`.
    pub fn powi(self, n: i32) -> Self {
        let x = self.value;
        let nf = F::from(n).unwrap();
        unary(
            self,
            x.powi(n),
            nf * x.powi(n - 1),
            nf * F::from(n - 1).unwrap() * x.powi(n - 2),
        )
    }

    /// Exponential, `e^x`.
    pub fn exp(self) -> Self {
        let e = self.value.exp();
        unary(self, e, e, e)
    }

    /// Natural logarithm.
    pub fn ln(self) -> Self {
        let inv = F::one() / self.value;
        unary(self, self.value.ln(), inv, -inv * inv)
    }

    /// Sine.
    pub fn sin(self) -> Self {
        let s = self.value.sin();
        unary(self, s, self.value.cos(), -s)
    }

    /// Cosine.
    pub fn cos(self) -> Self {
        let c = self.value.cos();
        unary(self, c, -self.value.sin(), -c)
    }

    /// Tangent.
    pub fn tan(self) -> Self {
        let t = self.value.tan();
        let sec = F::one() / self.value.cos();
        let sec_sq = sec * sec;
        unary(self, t, sec_sq, (t + t) * sec_sq)
    }

    /// Inverse sine.
    pub fn asin(self) -> Self {
        let t = F::one() / (F::one() - self.value * self.value);
        let d = t.sqrt();
        unary(self, self.value.asin(), d, self.value * d * t)
    }

    /// Inverse cosine.
    pub fn acos(self) -> Self {
        let t = F::one() / (F::one() - self.value * self.value);
        let d = -t.sqrt();
        unary(self, self.value.acos(), d, self.value * d * t)
    }
}
