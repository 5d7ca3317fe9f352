//! The recording graph: an append-only vertex arena plus the second-order
//! accumulator, the edge-pushing reverse sweep, and the thread-local
//! current-graph hook used by the operator overloads.
//!
//! Vertices reference their operands by index, never by pointer; every edge
//! points to a strictly older vertex, so the graph is acyclic by
//! construction.

use std::cell::Cell;

use crate::active::Active;
use crate::float::Float;
use crate::sparse::SoMatrix;

/// Identifier of a vertex on the graph. Dense, assigned in append order
/// starting at 0.
pub type VertexId = u32;

/// A first-order edge from a vertex to one of its operands.
///
/// `to` equal to the owning vertex's own id means "no edge"; the sentinel
/// doubles as the leaf marker and as the empty second slot of unary
/// operations.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Edge<F: Float> {
    pub to: VertexId,
    pub w: F,
}

/// One recorded intermediate value. Fixed size; at most two outgoing edges.
///
/// `w` accumulates the first-order adjoint during the reverse sweep.
/// `so_w` is the local curvature: for a unary vertex ∂²f/∂p² of its sole
/// parent, for a binary vertex the mixed partial ∂²f/∂p₁∂p₂. Binary
/// vertices assume the pure second partials of both operands are zero,
/// which holds for addition, subtraction, and multiplication.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Vertex<F: Float> {
    pub e1: Edge<F>,
    pub e2: Edge<F>,
    pub w: F,
    pub so_w: F,
}

impl<F: Float> Vertex<F> {
    fn leaf(id: VertexId) -> Self {
        let none = Edge {
            to: id,
            w: F::zero(),
        };
        Vertex {
            e1: none,
            e2: none,
            w: F::zero(),
            so_w: F::zero(),
        }
    }
}

/// The tape: vertex arena plus second-order accumulator.
///
/// One graph is installed per thread at a time (see [`GraphGuard`]); every
/// operation on an [`Active`] appends to the installed graph. After the
/// output's adjoint is seeded, [`Graph::propagate`] runs a single reverse
/// sweep that yields the gradient and the full Hessian together.
pub struct Graph<F: Float> {
    vertices: Vec<Vertex<F>>,
    so_edges: SoMatrix<F>,
}

impl<F: Float> Default for Graph<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Graph<F> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Graph {
            vertices: Vec::new(),
            so_edges: SoMatrix::new(),
        }
    }

    /// Create a graph with pre-allocated room for `est_vertices` vertices.
    pub fn with_capacity(est_vertices: usize) -> Self {
        Graph {
            vertices: Vec::with_capacity(est_vertices),
            so_edges: SoMatrix::new(),
        }
    }

    /// Number of recorded vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Empty the vertex arena and zero the second-order accumulator.
    ///
    /// Scalars recorded before the clear hold dangling ids and must not be
    /// used afterwards.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.so_edges.set_zero();
    }

    /// Append a leaf vertex (an independent variable) holding `value`.
    pub fn leaf(&mut self, value: F) -> Active<F> {
        let id = self.new_vertex();
        Active { value, id }
    }

    fn new_vertex(&mut self) -> VertexId {
        assert!(
            self.vertices.len() < VertexId::MAX as usize,
            "graph is full: vertex ids exhausted"
        );
        let id = self.vertices.len() as VertexId;
        self.vertices.push(Vertex::leaf(id));
        id
    }

    /// Record `child = f(parent)`: set the child's sole outgoing edge with
    /// first-order weight `w` and local curvature `so_w = f''`.
    pub fn add_unary_edge(&mut self, child: Active<F>, parent: Active<F>, w: F, so_w: F) {
        let v = &mut self.vertices[child.id as usize];
        v.e1 = Edge { to: parent.id, w };
        v.so_w = so_w;
    }

    /// Record `child = f(p1, p2)`: set both outgoing edges and the mixed
    /// local curvature `so_w = ∂²f/∂p₁∂p₂`.
    pub fn add_binary_edge(
        &mut self,
        child: Active<F>,
        p1: Active<F>,
        p2: Active<F>,
        w1: F,
        w2: F,
        so_w: F,
    ) {
        let v = &mut self.vertices[child.id as usize];
        v.e1 = Edge { to: p1.id, w: w1 };
        v.e2 = Edge { to: p2.id, w: w2 };
        v.so_w = so_w;
    }

    /// Accumulate a second-order weight between vertices `i` and `j`.
    ///
    /// Stored at `(min, max)`; the pair order never matters.
    pub fn add_so_edge(&mut self, i: VertexId, j: VertexId, w: F) {
        self.so_edges.add(i, j, w);
    }

    /// Seed the first-order adjoint of `x` (typically 1 on the output).
    pub fn set_adjoint(&mut self, x: Active<F>, adjoint: F) {
        self.vertices[x.id as usize].w = adjoint;
    }

    /// The stored first-order adjoint of `x`: after [`Graph::propagate`],
    /// the partial derivative of the seeded output with respect to `x`.
    pub fn adjoint(&self, x: Active<F>) -> F {
        self.vertices[x.id as usize].w
    }

    /// The stored second-order weight between `x` and `y`: after
    /// [`Graph::propagate`], the mixed partial ∂²f/∂x∂y. Symmetric in its
    /// arguments.
    pub fn so_weight(&self, x: Active<F>, y: Active<F>) -> F {
        self.so_edges.get(x.id, y.id)
    }

    /// Run the edge-pushing reverse sweep.
    ///
    /// Visits vertices in strictly decreasing id order. At each non-leaf
    /// vertex the incident second-order edges are pushed through its
    /// first-order edges, new curvature is created from `so_w`, and the
    /// first-order adjoint is propagated to the parents, in that order:
    /// a vertex's incident edges must reflect every descendant before its
    /// own contribution is added.
    pub fn propagate(&mut self) {
        let n = self.vertices.len();
        self.so_edges.resize(n);
        for vid in (1..n as VertexId).rev() {
            let vertex = self.vertices[vid as usize];
            let e1 = vertex.e1;
            let e2 = vertex.e2;
            if e1.to == vid {
                // Leaf: nothing to discharge. Its column holds final
                // results and must survive the sweep.
                continue;
            }

            // Pushing. Every live second-order edge incident to vid has vid
            // as its upper index (pushes only ever target strictly smaller
            // upper indices), so the column is the complete incident set.
            // Detaching it consumes the edges and keeps the writes below
            // disjoint from the entries being walked.
            for (k, s) in self.so_edges.take_column(vid) {
                if k != vid {
                    push_edge(&mut self.so_edges, e1, k, s);
                    if e2.to != vid {
                        push_edge(&mut self.so_edges, e2, k, s);
                    }
                } else {
                    // Diagonal entry: self-curvature lands on each parent,
                    // cross-curvature between the parents.
                    self.so_edges.add(e1.to, e1.to, e1.w * e1.w * s);
                    if e2.to != vid {
                        self.so_edges.add(e2.to, e2.to, e2.w * e2.w * s);
                        let cross = e1.w * e2.w * s;
                        let cross = if e1.to == e2.to { cross + cross } else { cross };
                        self.so_edges.add(e1.to, e2.to, cross);
                    }
                }
            }

            let a = vertex.w;
            if a == F::zero() {
                continue;
            }

            // Creating.
            if vertex.so_w != F::zero() {
                if e2.to == vid {
                    self.so_edges.add(e1.to, e1.to, a * vertex.so_w);
                } else {
                    let w = a * vertex.so_w;
                    let w = if e1.to == e2.to { w + w } else { w };
                    self.so_edges.add(e1.to, e2.to, w);
                }
            }

            // Adjoint.
            self.vertices[vid as usize].w = F::zero();
            self.vertices[e1.to as usize].w = self.vertices[e1.to as usize].w + a * e1.w;
            if e2.to != vid {
                self.vertices[e2.to as usize].w = self.vertices[e2.to as usize].w + a * e2.w;
            }
        }
    }
}

/// Push one existing second-order edge of weight `s` between the current
/// vertex and `k` through the first-order edge `fo`. Coinciding endpoints
/// take the factor of 2 that compensates for symmetric storage.
fn push_edge<F: Float>(so_edges: &mut SoMatrix<F>, fo: Edge<F>, k: VertexId, s: F) {
    let w = fo.w * s;
    if fo.to == k {
        so_edges.add(fo.to, fo.to, w + w);
    } else {
        so_edges.add(fo.to, k, w);
    }
}

// Thread-local current-graph pointer.
thread_local! {
    static GRAPH_F32: Cell<*mut Graph<f32>> = const { Cell::new(std::ptr::null_mut()) };
    static GRAPH_F64: Cell<*mut Graph<f64>> = const { Cell::new(std::ptr::null_mut()) };
}

/// Trait to select the correct thread-local for a given float type.
pub trait GraphThreadLocal: Float {
    fn cell() -> &'static std::thread::LocalKey<Cell<*mut Graph<Self>>>;
}

impl GraphThreadLocal for f32 {
    fn cell() -> &'static std::thread::LocalKey<Cell<*mut Graph<Self>>> {
        &GRAPH_F32
    }
}

impl GraphThreadLocal for f64 {
    fn cell() -> &'static std::thread::LocalKey<Cell<*mut Graph<Self>>> {
        &GRAPH_F64
    }
}

/// Access the current graph for this thread. Panics if none is installed.
#[inline]
pub fn with_active_graph<F: GraphThreadLocal, R>(f: impl FnOnce(&mut Graph<F>) -> R) -> R {
    F::cell().with(|cell| {
        let ptr = cell.get();
        assert!(
            !ptr.is_null(),
            "no graph is installed on this thread; install one with GraphGuard::new \
             or use hedgehog::hessian() / hedgehog::grad()"
        );
        // SAFETY: GraphGuard keeps the pointer valid for the duration of
        // its scope, and only one mutable reference exists at a time
        // (single-threaded access via the thread-local).
        let graph = unsafe { &mut *ptr };
        f(graph)
    })
}

/// RAII guard that installs a graph as this thread's current graph and
/// restores the previous one on drop.
pub struct GraphGuard<F: GraphThreadLocal> {
    prev: *mut Graph<F>,
}

impl<F: GraphThreadLocal> GraphGuard<F> {
    /// Install `graph` as the thread-local current graph. Returns a guard
    /// that restores the previous graph on drop.
    pub fn new(graph: &mut Graph<F>) -> Self {
        let prev = F::cell().with(|cell| {
            let prev = cell.get();
            cell.set(graph as *mut Graph<F>);
            prev
        });
        GraphGuard { prev }
    }
}

impl<F: GraphThreadLocal> Drop for GraphGuard<F> {
    fn drop(&mut self) {
        F::cell().with(|cell| {
            cell.set(self.prev);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_product(graph: &mut Graph<f64>) -> (Active<f64>, Active<f64>, Active<f64>) {
        let x = graph.leaf(3.0);
        let y = graph.leaf(4.0);
        let f = graph.leaf(x.value * y.value);
        graph.add_binary_edge(f, x, y, y.value, x.value, 1.0);
        (x, y, f)
    }

    #[test]
    fn leaves_carry_self_referring_edges() {
        let mut graph = Graph::<f64>::new();
        let x = graph.leaf(1.0);
        let v = graph.vertices[x.id as usize];
        assert_eq!(v.e1.to, x.id);
        assert_eq!(v.e2.to, x.id);
        assert_eq!(v.w, 0.0);
        assert_eq!(v.so_w, 0.0);
    }

    #[test]
    fn ids_are_dense_and_ordered() {
        let mut graph = Graph::<f64>::new();
        for expect in 0..5u32 {
            let leaf = graph.leaf(expect as f64);
            assert_eq!(leaf.id, expect);
        }
        assert_eq!(graph.len(), 5);
    }

    #[test]
    fn edges_point_to_strictly_older_vertices() {
        let mut graph = Graph::<f64>::new();
        let (_, _, f) = record_product(&mut graph);
        let sq = graph.leaf(f.value * f.value);
        graph.add_binary_edge(sq, f, f, f.value, f.value, 1.0);

        for (id, v) in graph.vertices.iter().enumerate() {
            let id = id as VertexId;
            if v.e1.to != id {
                assert!(v.e1.to < id);
            }
            if v.e2.to != id {
                // A second edge implies a first.
                assert!(v.e1.to != id);
                assert!(v.e2.to < id);
            }
        }
    }

    #[test]
    fn adjoints_are_zero_until_seeded() {
        let mut graph = Graph::<f64>::new();
        let (x, y, f) = record_product(&mut graph);
        assert_eq!(graph.adjoint(x), 0.0);
        assert_eq!(graph.adjoint(y), 0.0);
        assert_eq!(graph.adjoint(f), 0.0);
    }

    #[test]
    fn propagate_product_by_hand() {
        let mut graph = Graph::<f64>::new();
        let (x, y, f) = record_product(&mut graph);
        graph.set_adjoint(f, 1.0);
        graph.propagate();

        assert_eq!(graph.adjoint(x), 4.0);
        assert_eq!(graph.adjoint(y), 3.0);
        assert_eq!(graph.so_weight(x, y), 1.0);
        assert_eq!(graph.so_weight(x, x), 0.0);
        assert_eq!(graph.so_weight(y, y), 0.0);
    }

    #[test]
    fn propagate_same_operand_product_doubles() {
        let mut graph = Graph::<f64>::new();
        let x = graph.leaf(5.0);
        let f = graph.leaf(25.0);
        graph.add_binary_edge(f, x, x, 5.0, 5.0, 1.0);
        graph.set_adjoint(f, 1.0);
        graph.propagate();

        assert_eq!(graph.adjoint(x), 10.0);
        assert_eq!(graph.so_weight(x, x), 2.0);
    }

    #[test]
    fn propagate_zero_seed_is_a_no_op() {
        let mut graph = Graph::<f64>::new();
        let (x, y, _) = record_product(&mut graph);
        graph.propagate();
        assert_eq!(graph.adjoint(x), 0.0);
        assert_eq!(graph.adjoint(y), 0.0);
        assert_eq!(graph.so_weight(x, y), 0.0);
    }

    #[test]
    fn propagate_empty_and_single_leaf() {
        let mut graph = Graph::<f64>::new();
        graph.propagate();
        let x = graph.leaf(2.0);
        graph.set_adjoint(x, 1.0);
        graph.propagate();
        assert_eq!(graph.adjoint(x), 1.0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut graph = Graph::<f64>::new();
        let (_, _, f) = record_product(&mut graph);
        graph.set_adjoint(f, 1.0);
        graph.propagate();
        graph.clear();
        assert!(graph.is_empty());

        let x = graph.leaf(7.0);
        assert_eq!(x.id, 0);
        assert_eq!(graph.so_weight(x, x), 0.0);
    }

    #[test]
    fn guard_restores_previous_graph() {
        let mut outer = Graph::<f64>::new();
        let _outer_guard = GraphGuard::new(&mut outer);
        let a = with_active_graph(|g: &mut Graph<f64>| g.leaf(1.0));
        {
            let mut inner = Graph::<f64>::new();
            let _inner_guard = GraphGuard::new(&mut inner);
            let b = with_active_graph(|g: &mut Graph<f64>| g.leaf(2.0));
            assert_eq!(b.id, 0);
        }
        let c = with_active_graph(|g: &mut Graph<f64>| g.leaf(3.0));
        assert_eq!(a.id, 0);
        assert_eq!(c.id, 1);
    }
}
