use std::collections::HashMap;
use tracing::debug;

use crate::combinatorics::load_cap;
use crate::constants::{MAX_SUPPORTED_PARTIES, MIN_THRESHOLD, SINK, SOURCE};
use crate::error::RecoverError;
use crate::secret::{secret_universe, Secret};

/// A directed, capacity-weighted edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub capacity: u64,
}

/// The bipartite assignment problem for one `(N, T)` pair, laid out as a flow
/// network.
///
/// Node ids are fixed: the source is `0`, the sink is `1`, participant `i` is
/// `i + 2` and secret number `s` of the universe is `N + 2 + s`. Only the
/// canonical quorum `0..T` is wired to the source, so participant nodes
/// `T..N` stay isolated.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    parties: u8,
    threshold: u8,
    secrets: Vec<Secret>,
    edges: Vec<Edge>,
    index: HashMap<(usize, usize), usize>,
}

impl FlowNetwork {
    /// Builds the network for `(parties, threshold)`.
    ///
    /// * source → participant `i` (for `i < T`): capacity `ceil(C(N, T-1) / T)`
    /// * participant `i` → secret `s`: capacity 1, iff `i ∈ s`
    /// * secret `s` → sink: capacity 1
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` unless `1 <= N <= 8` and `2 <= T < N`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shard_recover::network::FlowNetwork;
    ///
    /// let network = FlowNetwork::build(3, 2).unwrap();
    /// assert_eq!(network.node_count(), 2 + 3 + 3);
    /// assert_eq!(network.secrets().len(), 3);
    /// ```
    pub fn build(parties: u8, threshold: u8) -> Result<Self, RecoverError> {
        check_range(parties, threshold)?;

        let secrets = secret_universe(parties, threshold);
        let mut network = FlowNetwork {
            parties,
            threshold,
            secrets,
            edges: Vec::new(),
            index: HashMap::new(),
        };

        let cap = load_cap(parties, threshold);
        for i in 0..threshold {
            network.add_edge(SOURCE, network.participant_node(i), cap);
        }

        for s in 0..network.secrets.len() {
            network.add_edge(network.secret_node(s), SINK, 1);
        }

        for s in 0..network.secrets.len() {
            let members = network.secrets[s].members().to_vec();
            for member in members.into_iter().filter(|&m| m < threshold) {
                network.add_edge(network.participant_node(member), network.secret_node(s), 1);
            }
        }

        debug!(
            "Built flow network for N = {}, T = {}: {} nodes, {} edges, load cap {}",
            parties,
            threshold,
            network.node_count(),
            network.edges.len(),
            cap
        );
        Ok(network)
    }

    fn add_edge(&mut self, from: usize, to: usize, capacity: u64) {
        self.index.insert((from, to), self.edges.len());
        self.edges.push(Edge { from, to, capacity });
    }

    pub fn parties(&self) -> u8 {
        self.parties
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// The secret universe, in network order.
    pub fn secrets(&self) -> &[Secret] {
        &self.secrets
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.parties as usize + 2 + self.secrets.len()
    }

    pub fn participant_node(&self, participant: u8) -> usize {
        participant as usize + 2
    }

    pub fn secret_node(&self, secret: usize) -> usize {
        self.parties as usize + 2 + secret
    }

    /// Index into [`edges`](Self::edges) of the edge `from → to`, if present.
    pub fn edge_between(&self, from: usize, to: usize) -> Option<usize> {
        self.index.get(&(from, to)).copied()
    }

    /// Indices of the secret → sink edges.
    pub fn sink_edges(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.secrets.len()).filter_map(|s| self.edge_between(self.secret_node(s), SINK))
    }
}

/// Rejects `(N, T)` pairs outside `1 <= N <= 8`, `2 <= T < N`.
pub fn check_range(parties: u8, threshold: u8) -> Result<(), RecoverError> {
    let valid = (1..=MAX_SUPPORTED_PARTIES).contains(&parties)
        && threshold >= MIN_THRESHOLD
        && threshold < parties;
    if valid {
        Ok(())
    } else {
        Err(RecoverError::InvalidRange { parties, threshold })
    }
}
