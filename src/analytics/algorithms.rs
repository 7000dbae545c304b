//! Hypergraph analytics algorithms.
//!
//! Implements the six analytical operations on a snapshot:
//! - **Entity centrality** — betweenness on the s-line graph via
//!   `rustworkx_core::centrality::betweenness_centrality`, projected onto
//!   entities
//! - **Community detection (Louvain)** — greedy modularity local moves on the
//!   co-membership graph (custom implementation)
//! - **s-connectivity** — components of the s-line graph mapped to disjoint
//!   entity sets
//! - **Entity distances** — BFS over s-adjacent hyperedges
//! - **Topological summary** — density, edge-size stats, diameter
//! - **Diff** — id-set deltas between two snapshots
//!
//! Every operation is a pure function of its snapshot: identical input and
//! parameters produce identical output, down to ordering. Superlinear loops
//! take a [`Deadline`] and either flag partial results or fail with
//! `TimeoutExceeded`.

use crate::analytics::line_graph::{CoMembershipGraph, LineGraph};
use crate::analytics::models::{
    AnalyticsConfig, CentralityResult, CommunityInfo, CommunityResult, ComponentInfo,
    ConnectivityResult, DistanceResult, HypergraphDiff, TopologicalSummary,
};
use crate::error::{HypergraphError, HypergraphResult};
use crate::hypergraph::snapshot::HypergraphSnapshot;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::{Duration, Instant};

// ============================================================================
// Deadline
// ============================================================================

/// Cooperative time budget checked inside algorithm loops.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}

// ============================================================================
// Entity centrality (via rustworkx-core on the s-line graph)
// ============================================================================

/// Rank all entities by centrality over the s-line graph.
///
/// Edge-level betweenness is computed with rustworkx-core (normalized, no
/// endpoints), then projected onto each entity as the mean score of the
/// hyperedges containing it. Output covers every node, sorted by score
/// descending with ties broken by ascending entity id.
pub fn entity_centrality(snapshot: &HypergraphSnapshot, s: usize) -> Vec<CentralityResult> {
    if snapshot.is_empty() {
        return vec![];
    }

    let lg = LineGraph::build(snapshot);
    let g = lg.to_petgraph(s);
    let scores = rustworkx_core::centrality::betweenness_centrality(
        &g, false, // include_endpoints
        true,  // normalized
        200,   // parallel_threshold (sequential for small graphs)
    );
    let edge_scores: Vec<f64> = (0..lg.vertex_count())
        .map(|i| scores[i].unwrap_or(0.0))
        .collect();

    // entity id → ascending indices of hyperedges containing it
    let mut incident: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, id) in lg.edge_ids.iter().enumerate() {
        for p in &snapshot.edges[id].participants {
            incident.entry(p.as_str()).or_default().push(i);
        }
    }

    let mut results: Vec<CentralityResult> = snapshot
        .nodes
        .values()
        .map(|node| {
            let edges: &[usize] = incident
                .get(node.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let degree = edges.len();
            let score = if degree == 0 {
                0.0
            } else {
                edges.iter().map(|&i| edge_scores[i]).sum::<f64>() / degree as f64
            };
            CentralityResult {
                entity_id: node.id.clone(),
                name: node.name.clone(),
                score,
                degree,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    results
}

// ============================================================================
// Community detection — Louvain local moves on the co-membership graph
// ============================================================================

/// Partition entities by greedy modularity maximization.
///
/// Local moves run over the co-membership graph until no move improves
/// modularity or the sweep limit / deadline is hit. All bookkeeping uses
/// ordered maps and index order, so the partition is deterministic.
pub fn detect_communities(
    snapshot: &HypergraphSnapshot,
    config: &AnalyticsConfig,
    deadline: Deadline,
) -> CommunityResult {
    let graph = CoMembershipGraph::build(snapshot);
    let n = graph.vertex_count();
    // total_weight can only be zero with zero edges, which means zero nodes
    if n == 0 || graph.total_weight == 0.0 {
        return CommunityResult::empty();
    }

    let resolution = config.louvain_resolution;
    let m2 = 2.0 * graph.total_weight;

    // Initialize: each node in its own community
    let mut community: Vec<u32> = (0..n as u32).collect();

    // Maintain community total strength incrementally
    let mut comm_total_strength: BTreeMap<u32, f64> = BTreeMap::new();
    for (i, &ki) in graph.strengths.iter().enumerate() {
        *comm_total_strength.entry(community[i]).or_default() += ki;
    }

    let mut improved = true;
    let mut iterations = 0;
    let mut incomplete = false;

    while improved && iterations < config.louvain_max_iterations {
        if deadline.expired() {
            incomplete = true;
            break;
        }
        improved = false;
        iterations += 1;

        for node_idx in 0..n {
            let current_comm = community[node_idx];

            // Sum of weights to each neighboring community. Ordered map, so
            // equal-gain candidates resolve to the lowest community id.
            let mut comm_weights: BTreeMap<u32, f64> = BTreeMap::new();
            for &(neighbor, w) in &graph.adj[node_idx] {
                *comm_weights.entry(community[neighbor]).or_default() += w;
            }

            let w_in_current = comm_weights.get(&current_comm).copied().unwrap_or(0.0);
            let ki = graph.strengths[node_idx];

            // Cost of removing the node from its current community
            let sigma_tot_current = comm_total_strength
                .get(&current_comm)
                .copied()
                .unwrap_or(0.0);
            let remove_cost =
                w_in_current / m2 - resolution * ki * (sigma_tot_current - ki) / (m2 * m2);

            let mut best_comm = current_comm;
            let mut best_gain = 0.0;

            for (&target_comm, &w_to_target) in &comm_weights {
                if target_comm == current_comm {
                    continue;
                }
                let sigma_tot_target = comm_total_strength
                    .get(&target_comm)
                    .copied()
                    .unwrap_or(0.0);
                let insert_cost = w_to_target / m2 - resolution * ki * sigma_tot_target / (m2 * m2);
                let gain = insert_cost - remove_cost;

                if gain > best_gain {
                    best_gain = gain;
                    best_comm = target_comm;
                }
            }

            if best_comm != current_comm {
                *comm_total_strength.entry(current_comm).or_default() -= ki;
                *comm_total_strength.entry(best_comm).or_default() += ki;
                community[node_idx] = best_comm;
                improved = true;
            }
        }
    }

    // Group members per community (node_ids are sorted, so member lists are
    // ascending by construction)
    let mut comm_members: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, &c) in community.iter().enumerate() {
        comm_members.entry(c).or_default().push(i);
    }

    // Exact per-community modularity: internal/m2 − (total/m2)², summing to Q
    let mut internal: BTreeMap<u32, f64> = BTreeMap::new();
    for (i, neighbors) in graph.adj.iter().enumerate() {
        for &(j, w) in neighbors {
            if community[i] == community[j] {
                *internal.entry(community[i]).or_default() += w;
            }
        }
    }

    let mut communities: Vec<CommunityInfo> = comm_members
        .into_iter()
        .map(|(c, member_indices)| {
            let members: Vec<String> = member_indices
                .iter()
                .map(|&i| graph.node_ids[i].clone())
                .collect();

            let mut type_counts: BTreeMap<&str, usize> = BTreeMap::new();
            for id in &members {
                if let Some(node) = snapshot.nodes.get(id) {
                    *type_counts.entry(node.entity_type.as_str()).or_default() += 1;
                }
            }
            let mut by_frequency: Vec<(&str, usize)> = type_counts.into_iter().collect();
            by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            let dominant_types = by_frequency
                .into_iter()
                .take(2)
                .map(|(t, _)| t.to_string())
                .collect();

            let internal_c = internal.get(&c).copied().unwrap_or(0.0);
            let total_c: f64 = member_indices.iter().map(|&i| graph.strengths[i]).sum();
            let modularity_contribution = internal_c / m2 - (total_c / m2).powi(2);

            CommunityInfo {
                id: 0, // assigned after sorting
                size: members.len(),
                members,
                dominant_types,
                modularity_contribution,
            }
        })
        .collect();

    communities.sort_by(|a, b| {
        b.size
            .cmp(&a.size)
            .then_with(|| a.members[0].cmp(&b.members[0]))
    });
    for (id, info) in communities.iter_mut().enumerate() {
        info.id = id as u32;
    }

    let modularity = communities
        .iter()
        .map(|c| c.modularity_contribution)
        .sum();

    CommunityResult {
        communities,
        modularity,
        incomplete,
    }
}

// ============================================================================
// s-connectivity
// ============================================================================

/// Compute s-connected components for each requested s.
pub fn analyze_connectivity(
    snapshot: &HypergraphSnapshot,
    s_values: &[usize],
) -> Vec<ConnectivityResult> {
    let lg = LineGraph::build(snapshot);
    s_values
        .iter()
        .map(|&s| connectivity_at(snapshot, &lg, s))
        .collect()
}

/// Components at one s: take the s-line graph's edge components, expand each
/// to its participant union, then make the node sets disjoint by greedy
/// assignment — larger sets claim their nodes first (ties broken by smallest
/// member id), and later sets keep only what is still unclaimed.
fn connectivity_at(
    snapshot: &HypergraphSnapshot,
    lg: &LineGraph,
    s: usize,
) -> ConnectivityResult {
    let mut node_sets: Vec<BTreeSet<&str>> = lg
        .s_components(s)
        .iter()
        .map(|component| {
            component
                .iter()
                .flat_map(|&i| {
                    snapshot.edges[&lg.edge_ids[i]]
                        .participants
                        .iter()
                        .map(String::as_str)
                })
                .collect()
        })
        .collect();

    node_sets.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a.iter().next().cmp(&b.iter().next()))
    });

    let mut assigned: BTreeSet<&str> = BTreeSet::new();
    let mut member_lists: Vec<Vec<&str>> = Vec::new();
    for set in &node_sets {
        let fresh: Vec<&str> = set
            .iter()
            .copied()
            .filter(|id| !assigned.contains(id))
            .collect();
        if fresh.is_empty() {
            continue;
        }
        assigned.extend(fresh.iter().copied());
        member_lists.push(fresh);
    }

    member_lists.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(b[0])));

    let components: Vec<ComponentInfo> = member_lists
        .into_iter()
        .enumerate()
        .map(|(id, members)| ComponentInfo {
            id: id as u32,
            size: members.len(),
            is_island: members.len() < 3,
            members: members.into_iter().map(String::from).collect(),
        })
        .collect();

    ConnectivityResult {
        s,
        component_count: components.len(),
        island_count: components.iter().filter(|c| c.is_island).count(),
        components,
    }
}

// ============================================================================
// Entity distances (s-walk BFS)
// ============================================================================

/// BFS distances from one entity over s-adjacent hyperedges.
///
/// A node's distance is the number of hyperedges on the shortest s-walk
/// reaching it: co-members of an edge containing the source are at 1, one
/// s-adjacent hop further is 2, and so on. The source reports 0; nodes no
/// s-walk reaches report `None` with `reachable = false`.
pub fn entity_distances(
    snapshot: &HypergraphSnapshot,
    entity_id: &str,
    s: usize,
    deadline: Deadline,
) -> HypergraphResult<Vec<DistanceResult>> {
    if !snapshot.contains_entity(entity_id) {
        return Err(HypergraphError::EntityNotFound(entity_id.to_string()));
    }

    let lg = LineGraph::build(snapshot);

    let mut edge_level: Vec<Option<u32>> = vec![None; lg.vertex_count()];
    let mut node_distance: BTreeMap<&str, u32> = BTreeMap::new();
    let mut queue: VecDeque<(usize, u32)> = VecDeque::new();

    for (i, id) in lg.edge_ids.iter().enumerate() {
        if snapshot.edges[id].participants.contains(entity_id) {
            edge_level[i] = Some(1);
            queue.push_back((i, 1));
        }
    }

    while let Some((current, level)) = queue.pop_front() {
        if deadline.expired() {
            return Err(HypergraphError::TimeoutExceeded(deadline.budget()));
        }
        for p in &snapshot.edges[&lg.edge_ids[current]].participants {
            node_distance.entry(p.as_str()).or_insert(level);
        }
        for neighbor in lg.s_neighbors(current, s) {
            if edge_level[neighbor].is_none() {
                edge_level[neighbor] = Some(level + 1);
                queue.push_back((neighbor, level + 1));
            }
        }
    }

    let mut rows: Vec<DistanceResult> = snapshot
        .nodes
        .values()
        .map(|node| {
            let distance = if node.id == entity_id {
                Some(0)
            } else {
                node_distance.get(node.id.as_str()).copied()
            };
            DistanceResult {
                entity_id: node.id.clone(),
                name: node.name.clone(),
                reachable: distance.is_some(),
                distance,
            }
        })
        .collect();

    rows.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.entity_id.cmp(&b.entity_id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.entity_id.cmp(&b.entity_id),
    });

    Ok(rows)
}

// ============================================================================
// Topological summary
// ============================================================================

/// Global structural summary.
///
/// Density follows the documented contract
/// `2·edge_count / (node_count·(node_count−1))`; the diameter is the longest
/// finite shortest s=1 path, found by per-source BFS over the co-membership
/// graph. When the deadline expires mid-scan the summary is returned with the
/// diameter found so far and `incomplete` set.
pub fn topological_summary(snapshot: &HypergraphSnapshot, deadline: Deadline) -> TopologicalSummary {
    if snapshot.is_empty() {
        return TopologicalSummary::empty();
    }

    let node_count = snapshot.node_count();
    let edge_count = snapshot.edge_count();

    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };

    let arities: Vec<usize> = snapshot.edges.values().map(|e| e.arity()).collect();
    let participant_sum: usize = arities.iter().sum();
    let avg_edge_size = participant_sum as f64 / edge_count as f64;
    let max_edge_size = arities.iter().max().copied().unwrap_or(0);
    let avg_node_degree = participant_sum as f64 / node_count as f64;

    let graph = CoMembershipGraph::build(snapshot);
    let n = graph.vertex_count();
    let mut diameter = 0usize;
    let mut incomplete = false;

    let mut distance: Vec<Option<u32>> = vec![None; n];
    for source in 0..n {
        if deadline.expired() {
            incomplete = true;
            break;
        }

        distance.iter_mut().for_each(|d| *d = None);
        distance[source] = Some(0);
        let mut queue = VecDeque::new();
        queue.push_back(source);
        let mut eccentricity = 0u32;

        while let Some(current) = queue.pop_front() {
            let level = match distance[current] {
                Some(level) => level,
                None => continue,
            };
            eccentricity = eccentricity.max(level);
            for &(neighbor, _) in &graph.adj[current] {
                if distance[neighbor].is_none() {
                    distance[neighbor] = Some(level + 1);
                    queue.push_back(neighbor);
                }
            }
        }

        diameter = diameter.max(eccentricity as usize);
    }

    if node_count < 2 {
        diameter = 0;
    }

    TopologicalSummary {
        node_count,
        edge_count,
        density,
        avg_edge_size,
        max_edge_size,
        avg_node_degree,
        diameter,
        incomplete,
    }
}

// ============================================================================
// Snapshot diff
// ============================================================================

/// Structural delta between two snapshots by id-set difference. An edge in
/// both snapshots counts as modified when its aggregate confidence (bitwise)
/// or participant set differs.
pub fn diff(before: &HypergraphSnapshot, after: &HypergraphSnapshot) -> HypergraphDiff {
    let added_edges: Vec<String> = after
        .edges
        .keys()
        .filter(|id| !before.edges.contains_key(*id))
        .cloned()
        .collect();
    let removed_edges: Vec<String> = before
        .edges
        .keys()
        .filter(|id| !after.edges.contains_key(*id))
        .cloned()
        .collect();
    let modified_edges: Vec<String> = before
        .edges
        .iter()
        .filter(|(id, b)| {
            after.edges.get(*id).is_some_and(|a| {
                a.aggregate_confidence.to_bits() != b.aggregate_confidence.to_bits()
                    || a.participants != b.participants
            })
        })
        .map(|(id, _)| id.clone())
        .collect();

    let added_nodes: Vec<String> = after
        .nodes
        .keys()
        .filter(|id| !before.nodes.contains_key(*id))
        .cloned()
        .collect();
    let removed_nodes: Vec<String> = before
        .nodes
        .keys()
        .filter(|id| !after.nodes.contains_key(*id))
        .cloned()
        .collect();

    HypergraphDiff {
        added_edges,
        removed_edges,
        modified_edges,
        added_nodes,
        removed_nodes,
        before_created_at: before.created_at,
        after_created_at: after.created_at,
    }
}

// ============================================================================
// Tests
// ============================================================================
