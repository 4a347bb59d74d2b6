use skel_core::Point3;

pub type VertexId = usize;
pub type EdgeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    EndPoint,
    /// A whole junction cluster collapsed into one vertex.
    Junction,
    /// Single slab voxel anchoring a ring that has no other vertex.
    LoopAnchor,
}

/// Classification assigned by [`Graph::depth_first_search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeKind {
    #[default]
    Undefined,
    Tree,
    Back,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub kind: VertexKind,
    pub points: Vec<Point3>,
    pub edges: Vec<EdgeId>,
    pub visit_order: Option<usize>,
    pub predecessor: Option<EdgeId>,
}

impl Vertex {
    pub fn contains(&self, p: Point3) -> bool {
        self.points.contains(&p)
    }

    pub fn first_point(&self) -> Option<Point3> {
        self.points.first().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub v1: VertexId,
    pub v2: VertexId,
    /// Interior slab voxels in trace order.
    pub slabs: Vec<Point3>,
    /// Calibrated length of the traced path.
    pub length: f64,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn is_loop(&self) -> bool {
        self.v1 == self.v2
    }

    pub fn opposite(&self, v: VertexId) -> VertexId {
        if self.v1 == v { self.v2 } else { self.v1 }
    }
}

/// Vertex/edge arenas for one tree. Ids index into the arenas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub root: Option<VertexId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, kind: VertexKind, points: Vec<Point3>) -> VertexId {
        let id = self.vertices.len();
        self.vertices.push(Vertex {
            id,
            kind,
            points,
            edges: Vec::new(),
            visit_order: None,
            predecessor: None,
        });
        id
    }

    /// Adds an edge and registers it with both endpoints (once for a
    /// self-loop).
    pub fn add_edge(&mut self, v1: VertexId, v2: VertexId, slabs: Vec<Point3>, length: f64) -> EdgeId {
        let id = self.edges.len();
        self.edges.push(Edge {
            id,
            v1,
            v2,
            slabs,
            length,
            kind: EdgeKind::Undefined,
        });
        self.vertices[v1].edges.push(id);
        if v1 != v2 {
            self.vertices[v2].edges.push(id);
        }
        id
    }

    pub fn find_vertex(&self, p: Point3) -> Option<VertexId> {
        self.vertices.iter().position(|v| v.contains(p))
    }

    pub fn num_vertices(&self, kind: VertexKind) -> usize {
        self.vertices.iter().filter(|v| v.kind == kind).count()
    }

    pub fn num_slabs(&self) -> usize {
        self.edges.iter().map(|e| e.slabs.len()).sum()
    }

    pub fn total_length(&self) -> f64 {
        self.edges.iter().map(|e| e.length).sum()
    }

    pub fn maximum_branch_length(&self) -> f64 {
        self.edges.iter().map(|e| e.length).fold(0.0, f64::max)
    }

    pub fn average_branch_length(&self) -> f64 {
        if self.edges.is_empty() {
            0.0
        } else {
            self.total_length() / self.edges.len() as f64
        }
    }

    pub fn back_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.kind == EdgeKind::Back)
    }

    fn reset_search(&mut self) {
        for v in &mut self.vertices {
            v.visit_order = None;
            v.predecessor = None;
        }
        for e in &mut self.edges {
            e.kind = EdgeKind::Undefined;
        }
    }

    /// Iterative depth-first search from the root.
    ///
    /// Visit orders and predecessors are written to the vertices, every edge
    /// reachable from the root is classified as tree or back edge, and the
    /// back edges are returned in discovery order. A self-loop is always a
    /// back edge. Runs from scratch on every call.
    pub fn depth_first_search(&mut self) -> Vec<EdgeId> {
        self.reset_search();
        let Some(root) = self.root else {
            return Vec::new();
        };

        let mut back = Vec::new();
        let mut stack = vec![root];
        let mut order = 0;

        while let Some(u) = stack.pop() {
            if self.vertices[u].visit_order.is_some() {
                continue;
            }
            if let Some(pre) = self.vertices[u].predecessor {
                self.edges[pre].kind = EdgeKind::Tree;
            }
            self.vertices[u].visit_order = Some(order);
            order += 1;

            for i in 0..self.vertices[u].edges.len() {
                let e = self.vertices[u].edges[i];
                if self.edges[e].kind != EdgeKind::Undefined {
                    continue;
                }
                let w = self.edges[e].opposite(u);
                if self.vertices[w].visit_order.is_none() {
                    self.vertices[w].predecessor = Some(e);
                    stack.push(w);
                } else {
                    self.edges[e].kind = EdgeKind::Back;
                    back.push(e);
                }
            }
        }

        back
    }

    /// Edges of the cycle closed by `back`: the back edge itself, then the
    /// predecessor chain from its later-visited endpoint up to the earlier
    /// one. Requires a preceding [`Graph::depth_first_search`].
    pub fn cycle_edges(&self, back: EdgeId) -> Vec<EdgeId> {
        let edge = &self.edges[back];
        let order = |v: VertexId| self.vertices[v].visit_order;
        let (last, mut current) = if order(edge.v1) < order(edge.v2) {
            (edge.v1, edge.v2)
        } else {
            (edge.v2, edge.v1)
        };

        let mut cycle = vec![back];
        while current != last {
            let Some(pre) = self.vertices[current].predecessor else {
                break;
            };
            cycle.push(pre);
            current = self.edges[pre].opposite(current);
        }
        cycle
    }
}
