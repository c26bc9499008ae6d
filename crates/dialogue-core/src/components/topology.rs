//! Topology
//!
//! The fixed social graph over which messages travel. Node `i` is bound to
//! the `i`-th agent passed to [`Topology::build`]; an explicit id index makes
//! neighbor lookup independent of agent equality.

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;
use std::collections::{BTreeSet, HashMap};

use crate::components::agent::AgentId;
use crate::config::{TopologyKind, TopologySpec};
use crate::error::SimError;

/// Undirected graph with one agent per node.
#[derive(Debug, Clone)]
pub struct Topology {
    kind: TopologyKind,
    graph: UnGraph<AgentId, ()>,
    index: HashMap<AgentId, NodeIndex>,
}

impl Topology {
    /// Builds the graph described by `spec` and binds `agents[i]` to node `i`.
    pub fn build<R: Rng + ?Sized>(
        spec: &TopologySpec,
        agents: &[AgentId],
        rng: &mut R,
    ) -> Result<Self, SimError> {
        let n = spec.num_agents();
        if agents.len() != n {
            return Err(SimError::AgentCountMismatch {
                nodes: n,
                agents: agents.len(),
            });
        }

        let edges = match spec.kind() {
            TopologyKind::Star => star_edges(n),
            TopologyKind::SmallWorld => {
                watts_strogatz_edges(n, spec.small_world_k(), spec.small_world_p(), rng)
            }
            TopologyKind::ScaleFree => barabasi_albert_edges(n, spec.scale_free_m(), rng),
        };

        let mut graph = UnGraph::with_capacity(n, edges.len());
        let mut index = HashMap::with_capacity(n);
        for &id in agents {
            let node = graph.add_node(id);
            if index.insert(id, node).is_some() {
                return Err(SimError::DuplicateAgent(id));
            }
        }
        for (a, b) in edges {
            graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
        }

        tracing::debug!(
            topology = %spec.kind(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built topology"
        );

        Ok(Self { kind: spec.kind(), graph, index })
    }

    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.index.contains_key(&agent)
    }

    /// Agents adjacent to `agent`, ordered by node index.
    pub fn neighbors(&self, agent: AgentId) -> Result<Vec<AgentId>, SimError> {
        let node = self.node_of(agent)?;
        let mut nodes: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        nodes.sort_unstable();
        nodes.dedup();
        Ok(nodes.into_iter().map(|n| self.graph[n]).collect())
    }

    pub fn degree(&self, agent: AgentId) -> Result<usize, SimError> {
        let node = self.node_of(agent)?;
        Ok(self.graph.neighbors(node).count())
    }

    pub fn is_connected(&self) -> bool {
        connected_components(&self.graph) == 1
    }

    /// Agent ids in node order.
    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.graph.node_indices().map(move |n| self.graph[n])
    }

    /// Edges as agent id pairs.
    pub fn edges(&self) -> Vec<(AgentId, AgentId)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (self.graph[a], self.graph[b]))
            .collect()
    }

    fn node_of(&self, agent: AgentId) -> Result<NodeIndex, SimError> {
        self.index
            .get(&agent)
            .copied()
            .ok_or(SimError::UnknownAgent(agent))
    }
}

/// Node 0 is the hub, every other node is a leaf.
fn star_edges(n: usize) -> Vec<(usize, usize)> {
    (1..n).map(|leaf| (0, leaf)).collect()
}

fn add_edge(adj: &mut [BTreeSet<usize>], a: usize, b: usize) {
    adj[a].insert(b);
    adj[b].insert(a);
}

fn remove_edge(adj: &mut [BTreeSet<usize>], a: usize, b: usize) {
    adj[a].remove(&b);
    adj[b].remove(&a);
}

fn edge_list(adj: &[BTreeSet<usize>]) -> Vec<(usize, usize)> {
    adj.iter()
        .enumerate()
        .flat_map(|(u, targets)| targets.iter().filter(move |&&v| u < v).map(move |&v| (u, v)))
        .collect()
}

/// Ring lattice of `k / 2` neighbors per side, each lattice edge rewired to
/// a uniformly chosen new endpoint with probability `p`.
///
/// Rewiring never creates self loops or parallel edges; a node already
/// connected to everyone keeps its edge.
fn watts_strogatz_edges<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    p: f64,
    rng: &mut R,
) -> Vec<(usize, usize)> {
    let half = k / 2;
    let mut adj = vec![BTreeSet::new(); n];

    for j in 1..=half {
        for u in 0..n {
            add_edge(&mut adj, u, (u + j) % n);
        }
    }

    for j in 1..=half {
        for u in 0..n {
            if rng.gen::<f64>() >= p {
                continue;
            }
            let v = (u + j) % n;
            let mut w = rng.gen_range(0..n);
            let mut saturated = false;
            while w == u || adj[u].contains(&w) {
                if adj[u].len() >= n - 1 {
                    saturated = true;
                    break;
                }
                w = rng.gen_range(0..n);
            }
            if !saturated && adj[u].contains(&v) {
                remove_edge(&mut adj, u, v);
                add_edge(&mut adj, u, w);
            }
        }
    }

    edge_list(&adj)
}

/// Preferential attachment: start from a star over `m + 1` nodes, then each
/// new node attaches to `m` distinct existing nodes chosen with probability
/// proportional to degree.
fn barabasi_albert_edges<R: Rng + ?Sized>(n: usize, m: usize, rng: &mut R) -> Vec<(usize, usize)> {
    let initial = (m + 1).min(n);
    let mut edges = star_edges(initial);

    // Each node appears once per incident edge
    let mut repeated: Vec<usize> = edges.iter().flat_map(|&(a, b)| [a, b]).collect();

    for source in initial..n {
        let mut targets = BTreeSet::new();
        while targets.len() < m {
            targets.insert(repeated[rng.gen_range(0..repeated.len())]);
        }
        for &target in &targets {
            edges.push((target, source));
            repeated.push(target);
            repeated.push(source);
        }
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopologySpec;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn ids(n: usize) -> Vec<AgentId> {
        (0..n as i64).map(AgentId).collect()
    }

    fn build(kind: TopologyKind, n: usize, k: usize, p: f64, m: usize, seed: u64) -> Topology {
        let spec = TopologySpec::new(kind, n, k, p, m).unwrap();
        Topology::build(&spec, &ids(n), &mut SmallRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_node_count_matches_for_all_kinds() {
        for n in 5..40 {
            for kind in TopologyKind::all() {
                let topology = build(*kind, n, 4, 0.3, 2, n as u64);
                assert_eq!(topology.node_count(), n, "{} with {} agents", kind, n);
                assert_eq!(topology.agents().collect::<Vec<_>>(), ids(n));
            }
        }
    }

    #[test]
    fn test_star_shape() {
        let topology = build(TopologyKind::Star, 4, 4, 0.3, 1, 0);

        assert_eq!(topology.edge_count(), 3);
        assert_eq!(
            topology.neighbors(AgentId(0)).unwrap(),
            vec![AgentId(1), AgentId(2), AgentId(3)]
        );
        assert_eq!(topology.neighbors(AgentId(2)).unwrap(), vec![AgentId(0)]);
        assert!(topology.is_connected());
    }

    #[test]
    fn test_ring_lattice_without_rewiring() {
        let topology = build(TopologyKind::SmallWorld, 10, 4, 0.0, 1, 3);

        assert_eq!(topology.edge_count(), 20);
        for id in ids(10) {
            assert_eq!(topology.degree(id).unwrap(), 4);
        }
        assert_eq!(
            topology.neighbors(AgentId(0)).unwrap(),
            vec![AgentId(1), AgentId(2), AgentId(8), AgentId(9)]
        );
    }

    #[test]
    fn test_rewiring_preserves_edge_count() {
        for seed in 0..20 {
            let topology = build(TopologyKind::SmallWorld, 12, 4, 1.0, 1, seed);
            assert_eq!(topology.edge_count(), 24);
            for (a, b) in topology.edges() {
                assert_ne!(a, b, "self loop");
            }
        }
    }

    #[test]
    fn test_scale_free_edges_and_connectivity() {
        for m in 1..4 {
            let topology = build(TopologyKind::ScaleFree, 20, 4, 0.3, m, 11);
            assert_eq!(topology.edge_count(), m + (20 - m - 1) * m);
            assert!(topology.is_connected());
        }

        let pair = build(TopologyKind::ScaleFree, 2, 4, 0.3, 1, 0);
        assert_eq!(pair.edge_count(), 1);
    }

    #[test]
    fn test_same_seed_same_graph() {
        let a = build(TopologyKind::SmallWorld, 15, 4, 0.5, 1, 99);
        let b = build(TopologyKind::SmallWorld, 15, 4, 0.5, 1, 99);
        assert_eq!(a.edges(), b.edges());

        let c = build(TopologyKind::ScaleFree, 15, 4, 0.5, 2, 99);
        let d = build(TopologyKind::ScaleFree, 15, 4, 0.5, 2, 99);
        assert_eq!(c.edges(), d.edges());
    }

    #[test]
    fn test_lookup_errors() {
        let topology = build(TopologyKind::Star, 3, 4, 0.3, 1, 0);
        assert!(matches!(
            topology.neighbors(AgentId(7)),
            Err(SimError::UnknownAgent(AgentId(7)))
        ));
        assert!(!topology.contains(AgentId::MODERATOR));
    }

    #[test]
    fn test_agent_binding_errors() {
        let spec = TopologySpec::star(3).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);

        assert!(matches!(
            Topology::build(&spec, &ids(4), &mut rng),
            Err(SimError::AgentCountMismatch { nodes: 3, agents: 4 })
        ));
        assert!(matches!(
            Topology::build(&spec, &[AgentId(0), AgentId(1), AgentId(1)], &mut rng),
            Err(SimError::DuplicateAgent(AgentId(1)))
        ));
    }

    #[test]
    fn test_ids_need_not_be_contiguous() {
        let spec = TopologySpec::star(3).unwrap();
        let agents = [AgentId(10), AgentId(20), AgentId(30)];
        let topology = Topology::build(&spec, &agents, &mut SmallRng::seed_from_u64(0)).unwrap();

        assert_eq!(
            topology.neighbors(AgentId(10)).unwrap(),
            vec![AgentId(20), AgentId(30)]
        );
        assert_eq!(topology.neighbors(AgentId(30)).unwrap(), vec![AgentId(10)]);
    }
}
