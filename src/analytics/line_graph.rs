//! Derived adjacency structures for hypergraph algorithms.
//!
//! The algorithms never walk the snapshot maps directly. Each call first
//! derives one of two plain index-addressed structures:
//!
//! - [`LineGraph`] — one vertex per hyperedge, adjacency annotated with the
//!   shared-participant count, so "s-adjacent" is a filter over one array.
//! - [`CoMembershipGraph`] — one vertex per entity, undirected weighted
//!   adjacency where the weight counts the hyperedges two entities share.
//!
//! Both keep their id arrays sorted and their adjacency lists in ascending
//! index order, which is what makes every downstream algorithm deterministic.

use crate::hypergraph::snapshot::HypergraphSnapshot;
use petgraph::graph::UnGraph;
use std::collections::{BTreeMap, VecDeque};

// ============================================================================
// s-line graph (hyperedge level)
// ============================================================================

/// The line graph of a snapshot: vertices are hyperedges, and two vertices
/// are connected with multiplicity = |participant intersection|. An edge pair
/// is s-adjacent when that multiplicity is ≥ s.
#[derive(Debug, Clone)]
pub struct LineGraph {
    /// Hyperedge ids, ascending; positions are the vertex indices below.
    pub edge_ids: Vec<String>,
    /// Participant count per hyperedge, parallel to `edge_ids`.
    pub arities: Vec<usize>,
    /// `adj[i]` = (j, shared participant count) for every j sharing ≥ 1
    /// participant with i, ascending by j.
    pub adj: Vec<Vec<(usize, usize)>>,
}

impl LineGraph {
    /// Derive the line graph by scanning each node's incidence list, so only
    /// edge pairs that actually intersect are ever touched.
    pub fn build(snapshot: &HypergraphSnapshot) -> Self {
        let edge_ids: Vec<String> = snapshot.edges.keys().cloned().collect();
        let index_of: BTreeMap<&str, usize> = edge_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let arities: Vec<usize> = edge_ids
            .iter()
            .map(|id| snapshot.edges[id].arity())
            .collect();

        // node id → ascending indices of edges containing it
        let mut incidence: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (id, edge) in &snapshot.edges {
            let idx = index_of[id.as_str()];
            for p in &edge.participants {
                incidence.entry(p.as_str()).or_default().push(idx);
            }
        }

        let mut pair_counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        for edges in incidence.values() {
            for (a, &i) in edges.iter().enumerate() {
                for &j in &edges[a + 1..] {
                    *pair_counts.entry((i, j)).or_default() += 1;
                }
            }
        }

        let mut adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); edge_ids.len()];
        for (&(i, j), &count) in &pair_counts {
            adj[i].push((j, count));
            adj[j].push((i, count));
        }
        for neighbors in adj.iter_mut() {
            neighbors.sort_unstable();
        }

        Self {
            edge_ids,
            arities,
            adj,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.edge_ids.len()
    }

    /// Indices of hyperedges s-adjacent to `edge`, ascending.
    pub fn s_neighbors(&self, edge: usize, s: usize) -> impl Iterator<Item = usize> + '_ {
        self.adj[edge]
            .iter()
            .filter(move |&&(_, shared)| shared >= s)
            .map(|&(j, _)| j)
    }

    /// Connected components of the s-line graph, as ascending edge-index
    /// lists, in order of each component's smallest edge index.
    pub fn s_components(&self, s: usize) -> Vec<Vec<usize>> {
        let n = self.vertex_count();
        let mut component_of: Vec<Option<u32>> = vec![None; n];
        let mut components: Vec<Vec<usize>> = Vec::new();

        for start in 0..n {
            if component_of[start].is_some() {
                continue;
            }
            let id = components.len() as u32;
            let mut members = vec![start];
            component_of[start] = Some(id);

            let mut queue = VecDeque::new();
            queue.push_back(start);
            while let Some(current) = queue.pop_front() {
                for neighbor in self.s_neighbors(current, s) {
                    if component_of[neighbor].is_none() {
                        component_of[neighbor] = Some(id);
                        members.push(neighbor);
                        queue.push_back(neighbor);
                    }
                }
            }

            members.sort_unstable();
            components.push(members);
        }

        components
    }

    /// Project the s-adjacency onto a petgraph graph for the centrality
    /// kernel. Vertex i corresponds to `edge_ids[i]`.
    pub fn to_petgraph(&self, s: usize) -> UnGraph<usize, ()> {
        let mut g = UnGraph::with_capacity(self.vertex_count(), 0);
        let indices: Vec<_> = (0..self.vertex_count()).map(|i| g.add_node(i)).collect();
        for (i, neighbors) in self.adj.iter().enumerate() {
            for &(j, shared) in neighbors {
                if j > i && shared >= s {
                    g.add_edge(indices[i], indices[j], ());
                }
            }
        }
        g
    }
}

// ============================================================================
// Co-membership graph (entity level)
// ============================================================================

/// Weighted undirected graph over entities where the weight of (u, v) counts
/// the hyperedges containing both. This is the structure community detection
/// and the diameter scan run on.
#[derive(Debug, Clone)]
pub struct CoMembershipGraph {
    /// Entity ids, ascending; positions are the vertex indices below.
    pub node_ids: Vec<String>,
    /// `adj[i]` = (j, shared-edge count) ascending by j, symmetric.
    pub adj: Vec<Vec<(usize, f64)>>,
    /// Weighted degree per vertex.
    pub strengths: Vec<f64>,
    /// Sum of all edge weights (each undirected edge counted once).
    pub total_weight: f64,
}

impl CoMembershipGraph {
    pub fn build(snapshot: &HypergraphSnapshot) -> Self {
        let node_ids: Vec<String> = snapshot.nodes.keys().cloned().collect();
        let index_of: BTreeMap<&str, usize> = node_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut pair_weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for edge in snapshot.edges.values() {
            let members: Vec<usize> = edge
                .participants
                .iter()
                .map(|p| index_of[p.as_str()])
                .collect();
            for (a, &i) in members.iter().enumerate() {
                for &j in &members[a + 1..] {
                    // BTreeSet iteration keeps members ascending, so i < j
                    *pair_weights.entry((i, j)).or_default() += 1.0;
                }
            }
        }

        let n = node_ids.len();
        let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut strengths = vec![0.0; n];
        let mut total_weight = 0.0;
        for (&(i, j), &w) in &pair_weights {
            adj[i].push((j, w));
            adj[j].push((i, w));
            strengths[i] += w;
            strengths[j] += w;
            total_weight += w;
        }
        for neighbors in adj.iter_mut() {
            neighbors.sort_unstable_by_key(|&(j, _)| j);
        }

        Self {
            node_ids,
            adj,
            strengths,
            total_weight,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.node_ids.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
