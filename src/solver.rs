use std::collections::VecDeque;
use tracing::debug;

use crate::error::RecoverError;
use crate::network::FlowNetwork;

/// Integral flow value on every edge of a network, indexed like
/// [`FlowNetwork::edges`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    pub values: Vec<u64>,
    pub total: u64,
}

impl Flow {
    /// Flow on `edge`; edges missing from `values` carry nothing.
    pub fn on(&self, edge: usize) -> u64 {
        self.values.get(edge).copied().unwrap_or(0)
    }
}

/// A maximum-flow algorithm.
///
/// Implementations must return an integral flow that respects every capacity,
/// conserves flow at internal nodes and is maximal from `source` to `sink`.
pub trait MaxFlowSolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, network: &FlowNetwork, source: usize, sink: usize)
        -> Result<Flow, RecoverError>;
}

/// Residual graph: edge `i` of the network becomes arc `2i` (forward) and arc
/// `2i + 1` (backward), so `arc ^ 1` is always the paired arc.
struct Residual {
    adjacency: Vec<Vec<usize>>,
    head: Vec<usize>,
    capacity: Vec<u64>,
}

impl Residual {
    fn new(network: &FlowNetwork) -> Self {
        let edges = network.edges();
        let mut adjacency = vec![Vec::new(); network.node_count()];
        let mut head = Vec::with_capacity(edges.len() * 2);
        let mut capacity = Vec::with_capacity(edges.len() * 2);

        for (i, edge) in edges.iter().enumerate() {
            adjacency[edge.from].push(2 * i);
            head.push(edge.to);
            capacity.push(edge.capacity);

            adjacency[edge.to].push(2 * i + 1);
            head.push(edge.from);
            capacity.push(0);
        }

        Residual {
            adjacency,
            head,
            capacity,
        }
    }

    fn tail(&self, arc: usize) -> usize {
        self.head[arc ^ 1]
    }

    fn push(&mut self, arc: usize, amount: u64) {
        self.capacity[arc] -= amount;
        self.capacity[arc ^ 1] += amount;
    }

    /// The backward arc's residual capacity is exactly the flow carried by
    /// the forward edge.
    fn into_flow(self, total: u64) -> Flow {
        let values = self.capacity.iter().skip(1).step_by(2).copied().collect();
        Flow { values, total }
    }
}

fn check_terminals(network: &FlowNetwork, source: usize, sink: usize) -> Result<(), RecoverError> {
    let node_count = network.node_count();
    for node in [source, sink] {
        if node >= node_count {
            return Err(RecoverError::InvalidNode { node, node_count });
        }
    }
    Ok(())
}

/// Shortest augmenting paths found by breadth-first search.
#[derive(Debug, Default, Clone, Copy)]
pub struct EdmondsKarp;

impl MaxFlowSolver for EdmondsKarp {
    fn name(&self) -> &'static str {
        "edmonds-karp"
    }

    fn solve(
        &self,
        network: &FlowNetwork,
        source: usize,
        sink: usize,
    ) -> Result<Flow, RecoverError> {
        check_terminals(network, source, sink)?;
        let mut residual = Residual::new(network);
        let mut total = 0;
        let mut augmentations = 0;

        if source != sink {
            loop {
                // arc used to reach each node
                let mut parent: Vec<Option<usize>> = vec![None; network.node_count()];
                let mut visited = vec![false; network.node_count()];
                visited[source] = true;
                let mut queue = VecDeque::from([source]);

                while let Some(u) = queue.pop_front() {
                    if u == sink {
                        break;
                    }
                    for &arc in &residual.adjacency[u] {
                        let v = residual.head[arc];
                        if !visited[v] && residual.capacity[arc] > 0 {
                            visited[v] = true;
                            parent[v] = Some(arc);
                            queue.push_back(v);
                        }
                    }
                }

                if !visited[sink] {
                    break;
                }

                let mut bottleneck = u64::MAX;
                let mut v = sink;
                while let Some(arc) = parent[v] {
                    bottleneck = bottleneck.min(residual.capacity[arc]);
                    v = residual.tail(arc);
                }

                let mut v = sink;
                while let Some(arc) = parent[v] {
                    residual.push(arc, bottleneck);
                    v = residual.tail(arc);
                }

                total += bottleneck;
                augmentations += 1;
            }
        }

        debug!(
            "edmonds-karp: flow {} after {} augmentations",
            total, augmentations
        );
        Ok(residual.into_flow(total))
    }
}

const UNREACHED: usize = usize::MAX;

/// Blocking flows on successive BFS level graphs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dinic;

impl Dinic {
    fn levels(residual: &Residual, source: usize) -> Vec<usize> {
        let mut level = vec![UNREACHED; residual.adjacency.len()];
        level[source] = 0;
        let mut queue = VecDeque::from([source]);
        while let Some(u) = queue.pop_front() {
            for &arc in &residual.adjacency[u] {
                let v = residual.head[arc];
                if level[v] == UNREACHED && residual.capacity[arc] > 0 {
                    level[v] = level[u] + 1;
                    queue.push_back(v);
                }
            }
        }
        level
    }

    fn augment(
        residual: &mut Residual,
        u: usize,
        sink: usize,
        limit: u64,
        level: &[usize],
        next: &mut [usize],
    ) -> u64 {
        if u == sink {
            return limit;
        }
        while next[u] < residual.adjacency[u].len() {
            let arc = residual.adjacency[u][next[u]];
            let v = residual.head[arc];
            let available = residual.capacity[arc];
            if available > 0 && level[v] == level[u] + 1 {
                let pushed = Self::augment(residual, v, sink, limit.min(available), level, next);
                if pushed > 0 {
                    residual.push(arc, pushed);
                    return pushed;
                }
            }
            next[u] += 1;
        }
        0
    }
}

impl MaxFlowSolver for Dinic {
    fn name(&self) -> &'static str {
        "dinic"
    }

    fn solve(
        &self,
        network: &FlowNetwork,
        source: usize,
        sink: usize,
    ) -> Result<Flow, RecoverError> {
        check_terminals(network, source, sink)?;
        let mut residual = Residual::new(network);
        let mut total = 0;
        let mut phases = 0;

        if source != sink {
            loop {
                let level = Self::levels(&residual, source);
                if level[sink] == UNREACHED {
                    break;
                }
                let mut next = vec![0; network.node_count()];
                loop {
                    let pushed =
                        Self::augment(&mut residual, source, sink, u64::MAX, &level, &mut next);
                    if pushed == 0 {
                        break;
                    }
                    total += pushed;
                }
                phases += 1;
            }
        }

        debug!("dinic: flow {} after {} phases", total, phases);
        Ok(residual.into_flow(total))
    }
}

/// Solver selected by name, as accepted in configuration files.
pub fn solver_by_name(name: &str) -> Option<Box<dyn MaxFlowSolver>> {
    match name {
        "edmonds-karp" => Some(Box::new(EdmondsKarp)),
        "dinic" => Some(Box::new(Dinic)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SINK, SOURCE};

    fn check_flow(network: &FlowNetwork, flow: &Flow) {
        let mut balance = vec![0i64; network.node_count()];
        for (i, edge) in network.edges().iter().enumerate() {
            assert!(flow.on(i) <= edge.capacity);
            balance[edge.from] -= flow.on(i) as i64;
            balance[edge.to] += flow.on(i) as i64;
        }
        for (node, &b) in balance.iter().enumerate() {
            if node != SOURCE && node != SINK {
                assert_eq!(b, 0, "flow not conserved at node {node}");
            }
        }
        assert_eq!(balance[SINK], flow.total as i64);
        assert_eq!(balance[SOURCE], -(flow.total as i64));
    }

    #[test]
    fn test_solvers_saturate_every_instance() {
        let solvers: Vec<Box<dyn MaxFlowSolver>> = vec![Box::new(EdmondsKarp), Box::new(Dinic)];
        for solver in &solvers {
            for parties in 3..=8u8 {
                for threshold in 2..parties {
                    let network = FlowNetwork::build(parties, threshold).unwrap();
                    let flow = solver.solve(&network, SOURCE, SINK).unwrap();
                    check_flow(&network, &flow);
                    assert_eq!(flow.total as usize, network.secrets().len(), "{}", solver.name());
                }
            }
        }
    }

    #[test]
    fn test_solvers_agree_on_value() {
        let network = FlowNetwork::build(6, 3).unwrap();
        let a = EdmondsKarp.solve(&network, SOURCE, SINK).unwrap();
        let b = Dinic.solve(&network, SOURCE, SINK).unwrap();
        assert_eq!(a.total, b.total);
    }

    #[test]
    fn test_reversed_terminals_carry_nothing() {
        let network = FlowNetwork::build(4, 2).unwrap();
        let flow = EdmondsKarp.solve(&network, SINK, SOURCE).unwrap();
        assert_eq!(flow.total, 0);
        assert!(flow.values.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_invalid_terminal() {
        let network = FlowNetwork::build(3, 2).unwrap();
        let err = Dinic.solve(&network, SOURCE, 100).unwrap_err();
        assert_eq!(
            err,
            RecoverError::InvalidNode {
                node: 100,
                node_count: 8
            }
        );
    }

    #[test]
    fn test_solver_by_name() {
        assert_eq!(solver_by_name("dinic").map(|s| s.name()), Some("dinic"));
        assert_eq!(
            solver_by_name("edmonds-karp").map(|s| s.name()),
            Some("edmonds-karp")
        );
        assert!(solver_by_name("push-relabel").is_none());
    }
}
