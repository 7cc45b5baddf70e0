//! Router connectivity graph.
//!
//! Two routers are directly linked when their Euclidean distance is at most
//! the communication radius. The graph is built by exhaustive pairwise
//! comparison over `i < j`, which keeps it undirected and free of self-loops
//! by construction and computes each pair's distance exactly once.

use std::collections::VecDeque;

use super::geometry::distance;
use crate::common::Point2D;

/// Undirected router-to-router adjacency derived from a placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityGraph {
    node_count: usize,
    /// Edges as `(i, j)` with `i < j`, in lexicographic order.
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

impl ConnectivityGraph {
    /// Build the graph for `routers` with inclusive threshold `comm_radius`.
    ///
    /// O(n²) in the router count; placements are tens to low hundreds of
    /// routers.
    pub fn build(routers: &[Point2D], comm_radius: f64) -> Self {
        let node_count = routers.len();
        let mut edges = Vec::new();
        let mut adjacency = vec![Vec::new(); node_count];

        for i in 0..node_count {
            for j in (i + 1)..node_count {
                if distance(&routers[i], &routers[j]) <= comm_radius {
                    edges.push((i, j));
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                }
            }
        }

        log::debug!("Connectivity graph: {} routers, {} links (radius {})", node_count, edges.len(), comm_radius);

        Self {
            node_count,
            edges,
            adjacency,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Routers directly linked to router `i`, in ascending order.
    pub fn neighbors(&self, i: usize) -> &[usize] {
        self.adjacency.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, i: usize) -> usize {
        self.neighbors(i).len()
    }

    /// Edge membership; order of the endpoints does not matter.
    #[cfg(test)]
    pub fn contains(&self, i: usize, j: usize) -> bool {
        if i == j {
            return false;
        }
        let (a, b) = if i < j { (i, j) } else { (j, i) };
        self.edges.binary_search(&(a, b)).is_ok()
    }

    /// Connected components found by breadth-first search, each listed in
    /// ascending router order. Components appear in order of their smallest
    /// router index.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.node_count];
        let mut components = Vec::new();

        for start in 0..self.node_count {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut queue = VecDeque::from([start]);
            let mut component = vec![start];

            while let Some(current) = queue.pop_front() {
                for &next in &self.adjacency[current] {
                    if !visited[next] {
                        visited[next] = true;
                        component.push(next);
                        queue.push_back(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Router count of the largest connected component (SGC). Zero when
    /// there are no routers.
    pub fn giant_component_size(&self) -> usize {
        self.components().iter().map(Vec::len).max().unwrap_or(0)
    }
}
