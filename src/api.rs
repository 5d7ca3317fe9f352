//! Entry points: closure-based drivers plus the free-function seed/read
//! surface over the thread-local current graph.

use crate::active::Active;
use crate::float::Float;
use crate::graph::{self, Graph, GraphGuard, GraphThreadLocal};

/// Compute value, gradient, and full Hessian of a scalar function
/// `f : R^n → R` in a single reverse sweep.
///
/// ```
/// let (val, grad, hess) = hedgehog::hessian(|x| x[0] * x[0] * x[1], &[3.0_f64, 2.0]);
/// assert!((val - 18.0).abs() < 1e-12);
/// assert!((grad[0] - 12.0).abs() < 1e-12); // 2xy
/// assert!((grad[1] - 9.0).abs() < 1e-12); // x²
/// assert!((hess[0][0] - 4.0).abs() < 1e-12); // 2y
/// assert!((hess[0][1] - 6.0).abs() < 1e-12); // 2x
/// ```
pub fn hessian<F: Float + GraphThreadLocal>(
    f: impl FnOnce(&[Active<F>]) -> Active<F>,
    x: &[F],
) -> (F, Vec<F>, Vec<Vec<F>>) {
    let n = x.len();
    let mut graph = Graph::with_capacity(n * 10);

    let inputs: Vec<Active<F>> = x.iter().map(|&val| graph.leaf(val)).collect();

    let _guard = GraphGuard::new(&mut graph);
    let output = f(&inputs);

    graph.set_adjoint(output, F::one());
    graph.propagate();

    let grad = inputs.iter().map(|&v| graph.adjoint(v)).collect();
    let mut hess = vec![vec![F::zero(); n]; n];
    for i in 0..n {
        for j in i..n {
            let h = graph.so_weight(inputs[i], inputs[j]);
            hess[i][j] = h;
            hess[j][i] = h;
        }
    }
    (output.value(), grad, hess)
}

/// Compute the gradient of a scalar function `f : R^n → R`.
///
/// Same single sweep as [`hessian`], keeping only the first-order result.
///
/// ```
/// let g = hedgehog::grad(|x| x[0] * x[1] + x[1].sin(), &[2.0_f64, 0.0]);
/// assert!((g[0] - 0.0).abs() < 1e-12);
/// assert!((g[1] - 3.0).abs() < 1e-12);
/// ```
pub fn grad<F: Float + GraphThreadLocal>(
    f: impl FnOnce(&[Active<F>]) -> Active<F>,
    x: &[F],
) -> Vec<F> {
    let n = x.len();
    let mut graph = Graph::with_capacity(n * 10);

    let inputs: Vec<Active<F>> = x.iter().map(|&val| graph.leaf(val)).collect();

    let _guard = GraphGuard::new(&mut graph);
    let output = f(&inputs);

    graph.set_adjoint(output, F::one());
    graph.propagate();

    inputs.iter().map(|&v| graph.adjoint(v)).collect()
}

/// Seed the first-order adjoint of `x` on the current graph (typically 1
/// on the final output, before [`propagate`]).
pub fn set_adjoint<F: Float + GraphThreadLocal>(x: Active<F>, adjoint: F) {
    graph::with_active_graph(|g| g.set_adjoint(x, adjoint));
}

/// Run the edge-pushing reverse sweep on the current graph.
///
/// Equivalent to calling [`Graph::propagate`] on the installed graph; the
/// float type usually needs a turbofish (`propagate::<f64>()`) since
/// nothing constrains it here.
pub fn propagate<F: Float + GraphThreadLocal>() {
    graph::with_active_graph(|g: &mut Graph<F>| g.propagate());
}

/// Read the first-order adjoint of `x` from the current graph: after
/// propagation, the partial derivative of the seeded output w.r.t. `x`.
pub fn gradient_of<F: Float + GraphThreadLocal>(x: Active<F>) -> F {
    graph::with_active_graph(|g| g.adjoint(x))
}

/// Read the second-order weight between `x` and `y` from the current
/// graph: after propagation, the mixed partial ∂²f/∂x∂y. Symmetric.
pub fn hessian_of<F: Float + GraphThreadLocal>(x: Active<F>, y: Active<F>) -> F {
    graph::with_active_graph(|g| g.so_weight(x, y))
}
