use std::collections::HashMap;

use skel_core::{Calibration, Point3, VolumeView};

use crate::graph::{Graph, VertexId, VertexKind};
use crate::tag::{Tag, Tagging};
use crate::trees::Tree;
use crate::visited::VisitedFlags;

/// Builds one branch graph per tree.
///
/// Junction clusters become vertices first (vertex id = cluster index), then
/// branches are traced from every unvisited end point, then from every
/// junction voxel, and finally a ring tree gets a single self-loop through
/// its starting slab. Trees must carry their junction clusters.
pub fn build_graphs(
    skeleton: &VolumeView<'_, u8>,
    tagging: &Tagging,
    trees: &[Tree],
    calibration: &Calibration,
) -> Vec<Graph> {
    let mut tracer = BranchTracer {
        skeleton: *skeleton,
        tagging,
        calibration,
        visited: VisitedFlags::new(skeleton.dims()),
    };
    let graphs: Vec<Graph> = trees.iter().map(|t| tracer.tree_graph(t)).collect();

    tracing::debug!(
        trees = graphs.len(),
        edges = graphs.iter().map(|g| g.edges.len()).sum::<usize>(),
        "built branch graphs"
    );
    graphs
}

struct BranchTracer<'a> {
    skeleton: VolumeView<'a, u8>,
    tagging: &'a Tagging,
    calibration: &'a Calibration,
    visited: VisitedFlags,
}

/// Outcome of walking a slab chain.
struct Trace {
    length: f64,
    /// Last voxel reached before stopping (the start if no step was taken).
    last: Point3,
    /// Non-slab voxel that ended the walk, if any.
    terminal: Option<Point3>,
}

impl BranchTracer<'_> {
    fn tree_graph(&mut self, tree: &Tree) -> Graph {
        let mut graph = Graph::new();
        let mut junction_at: HashMap<Point3, VertexId> = HashMap::new();
        for cluster in &tree.clusters {
            let v = graph.add_vertex(VertexKind::Junction, cluster.clone());
            junction_at.extend(cluster.iter().map(|&p| (p, v)));
        }

        for &ep in &tree.end_points {
            if self.visited.is_visited(ep) {
                continue;
            }
            let v1 = graph.add_vertex(VertexKind::EndPoint, vec![ep]);
            if graph.root.is_none() {
                graph.root = Some(v1);
            }

            let mut slabs = Vec::new();
            let trace = self.visit_branch(ep, &mut slabs);
            let (v2, length) = if let Some(t) = trace.terminal {
                (terminal_vertex(&mut graph, &junction_at, t), trace.length)
            } else if let Some((v, d)) = self.junction_beyond(&junction_at, trace.last, None) {
                (v, trace.length + d)
            } else if trace.length > 0.0 {
                tracing::debug!(tree = tree.id, at = %trace.last, "branch ends on a slab");
                (
                    graph.add_vertex(VertexKind::EndPoint, vec![trace.last]),
                    trace.length,
                )
            } else {
                continue;
            };
            graph.add_edge(v1, v2, slabs, length);
        }

        if graph.root.is_none() && !tree.clusters.is_empty() {
            graph.root = Some(0);
        }

        for (origin, cluster) in tree.clusters.iter().enumerate() {
            for &j in cluster {
                self.visited.mark(j);
                while let Some(next) = self.visited.next_unvisited(&self.skeleton, j) {
                    if self.tagging.is(next, Tag::Junction) {
                        self.visited.mark(next);
                        continue;
                    }

                    let step = self.calibration.distance(j, next);
                    let mut slabs = Vec::new();
                    if self.tagging.is(next, Tag::Slab) {
                        slabs.push(next);
                    }
                    let trace = self.visit_branch(next, &mut slabs);

                    let (v2, extra) = if let Some(t) = trace.terminal {
                        (terminal_vertex(&mut graph, &junction_at, t), 0.0)
                    } else if self.tagging.is(trace.last, Tag::EndPoint) {
                        (
                            graph.add_vertex(VertexKind::EndPoint, vec![trace.last]),
                            0.0,
                        )
                    } else if let Some(found) =
                        self.junction_beyond(&junction_at, trace.last, Some(origin))
                    {
                        found
                    } else {
                        let skip = (trace.last == next).then_some(j);
                        (origin, self.closing_step(trace.last, cluster, skip))
                    };
                    graph.add_edge(origin, v2, slabs, step + trace.length + extra);
                }
            }
        }

        if let Some(s) = tree.starting_slab {
            let anchor = graph.add_vertex(VertexKind::LoopAnchor, vec![s]);
            graph.root = Some(anchor);

            let mut slabs = vec![s];
            let trace = self.visit_branch(s, &mut slabs);
            let closing = if trace.last.is_neighbor(s) {
                self.calibration.distance(trace.last, s)
            } else {
                0.0
            };
            let length = trace.length + closing;
            if length > 0.0 {
                graph.add_edge(anchor, anchor, slabs, length);
            }
        }

        tracing::trace!(
            tree = tree.id,
            vertices = graph.vertices.len(),
            edges = graph.edges.len(),
            "tree graph"
        );
        graph
    }

    /// Walks from `start` along unvisited voxels, collecting slabs, until a
    /// non-slab voxel is reached or no unvisited neighbor is left.
    fn visit_branch(&mut self, start: Point3, slabs: &mut Vec<Point3>) -> Trace {
        self.visited.mark(start);
        let mut last = start;
        let mut length = 0.0;

        while let Some(next) = self.visited.next_unvisited(&self.skeleton, last) {
            length += self.calibration.distance(last, next);
            self.visited.mark(next);
            if !self.tagging.is(next, Tag::Slab) {
                return Trace {
                    length,
                    last,
                    terminal: Some(next),
                };
            }
            slabs.push(next);
            last = next;
        }

        Trace {
            length,
            last,
            terminal: None,
        }
    }

    /// Junction vertex adjacent to `p`, other than `exclude`, with the step
    /// length to it. Used when a walk stops next to an already visited
    /// junction.
    fn junction_beyond(
        &self,
        junction_at: &HashMap<Point3, VertexId>,
        p: Point3,
        exclude: Option<VertexId>,
    ) -> Option<(VertexId, f64)> {
        p.neighbors().find_map(|q| {
            let v = *junction_at.get(&q)?;
            (Some(v) != exclude).then(|| (v, self.calibration.distance(p, q)))
        })
    }

    /// Step from the end of an inner loop back into its own cluster.
    fn closing_step(&self, p: Point3, cluster: &[Point3], skip: Option<Point3>) -> f64 {
        cluster
            .iter()
            .find(|&&q| q.is_neighbor(p) && Some(q) != skip)
            .map_or(0.0, |&q| self.calibration.distance(p, q))
    }
}

fn terminal_vertex(
    graph: &mut Graph,
    junction_at: &HashMap<Point3, VertexId>,
    t: Point3,
) -> VertexId {
    match junction_at.get(&t) {
        Some(&v) => v,
        None => graph.add_vertex(VertexKind::EndPoint, vec![t]),
    }
}
