//! Reverse-mode automatic differentiation specialized for second-order
//! derivatives: one reverse sweep yields the gradient *and* the full
//! Hessian of a scalar function.
//!
//! The computation graph is recorded implicitly while an ordinary
//! arithmetic expression over [`Active`] scalars evaluates; only the
//! floating-point derivative weights are stored, one fixed-size vertex per
//! intermediate value. The backward pass implements edge pushing (Gower &
//! Mello, "Hessian Matrices via Automatic Differentiation", 2010), which
//! exploits Hessian symmetry instead of interleaving n forward-reverse
//! passes.
//!
//! The quickest route is the closure API:
//!
//! ```
//! let (val, grad, hess) = hedgehog::hessian(
//!     |x| (x[0] * x[0] + x[1] * x[1]).ln(),
//!     &[1.0_f64, 1.0],
//! );
//! assert!((val - 2.0_f64.ln()).abs() < 1e-12);
//! assert!((grad[0] - 1.0).abs() < 1e-12);
//! assert!((hess[0][1] - (-1.0)).abs() < 1e-12);
//! ```
//!
//! For explicit control over recording, seeding, and extraction, install a
//! [`Graph`] with a [`GraphGuard`] and drive it directly:
//!
//! ```
//! use hedgehog::{Active, Graph, GraphGuard};
//!
//! let mut graph = Graph::new();
//! let _guard = GraphGuard::new(&mut graph);
//! let x = Active::new(3.0_f64);
//! let y = Active::new(4.0);
//! let f = x * y;
//! graph.set_adjoint(f, 1.0);
//! graph.propagate();
//! assert_eq!(graph.adjoint(x), 4.0);
//! assert_eq!(graph.so_weight(x, y), 1.0);
//! ```
//!
//! Recording captures one execution path: when a branch on an `Active`
//! comparison changes, the graph must be cleared and re-recorded.

pub mod active;
pub mod api;
pub mod float;
pub mod graph;
pub mod sparse;

mod ops;

pub use active::Active;
pub use api::{grad, gradient_of, hessian, hessian_of, propagate, set_adjoint};
pub use float::Float;
pub use graph::{Graph, GraphGuard, GraphThreadLocal, VertexId};
pub use sparse::SoMatrix;

/// Type alias for recording scalars over `f64`.
pub type Active64 = Active<f64>;
/// Type alias for recording scalars over `f32`.
pub type Active32 = Active<f32>;
