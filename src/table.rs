use lazy_static::lazy_static;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::assignment::{ensure_saturated, Assignment};
use crate::constants::{DEFAULT_MAX_PARTIES, MAX_SUPPORTED_PARTIES, MIN_THRESHOLD, SINK, SOURCE};
use crate::distribute::{relabel_shares, validate_active, Distribution, Permutation};
use crate::error::RecoverError;
use crate::network::FlowNetwork;
use crate::solver::{EdmondsKarp, MaxFlowSolver};

lazy_static! {
    /// Canonical solutions for `1 <= N <= 6`, built with the default solver.
    static ref CANONICAL_TABLE: Result<CanonicalTable, RecoverError> =
        CanonicalTable::build(DEFAULT_MAX_PARTIES, &EdmondsKarp);
}

/// Returns the process-wide canonical table, building it on first access.
pub fn canonical_table() -> Result<&'static CanonicalTable, RecoverError> {
    CANONICAL_TABLE.as_ref().map_err(Clone::clone)
}

/// Builds, solves and extracts the canonical assignment for one `(N, T)`.
///
/// # Errors
///
/// * `InvalidRange` if `(N, T)` is out of range.
/// * `NonSaturatingFlow` if the solver leaves a secret unassigned.
/// * `PartitionViolation` if the extracted sets do not partition the universe.
pub fn solve_instance(
    parties: u8,
    threshold: u8,
    solver: &dyn MaxFlowSolver,
) -> Result<Assignment, RecoverError> {
    let network = FlowNetwork::build(parties, threshold)?;
    let flow = solver.solve(&network, SOURCE, SINK)?;
    ensure_saturated(&network, &flow)?;

    let assignment = Assignment::extract(&network, &flow);
    assignment.check_partition()?;
    debug!(
        "Solved N = {}, T = {} with {}: loads {:?}",
        parties,
        threshold,
        solver.name(),
        (0..threshold).map(|i| assignment.load(i)).collect::<Vec<_>>()
    );
    Ok(assignment)
}

/// Canonical assignments for every `(N, T)` with `N <= max_parties` and
/// `2 <= T < N`. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTable {
    max_parties: u8,
    solver: &'static str,
    entries: BTreeMap<(u8, u8), Assignment>,
}

impl CanonicalTable {
    /// Solves every instance up to `max_parties`. `N = 1` and `N = 2` admit no
    /// threshold and contribute no entries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if `max_parties` is outside `1..=8`, and
    /// propagates the first failure of [`solve_instance`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shard_recover::solver::EdmondsKarp;
    /// use shard_recover::table::CanonicalTable;
    ///
    /// let table = CanonicalTable::build(4, &EdmondsKarp).unwrap();
    /// // (3, 2), (4, 2), (4, 3)
    /// assert_eq!(table.len(), 3);
    /// ```
    pub fn build(max_parties: u8, solver: &dyn MaxFlowSolver) -> Result<Self, RecoverError> {
        if max_parties == 0 || max_parties > MAX_SUPPORTED_PARTIES {
            return Err(RecoverError::InvalidRange {
                parties: max_parties,
                threshold: MIN_THRESHOLD,
            });
        }

        let mut entries = BTreeMap::new();
        for parties in 1..=max_parties {
            for threshold in MIN_THRESHOLD..parties {
                let assignment = solve_instance(parties, threshold, solver)?;
                entries.insert((parties, threshold), assignment);
            }
        }

        info!(
            "📋 Built canonical table for N <= {} with {}: {} entries",
            max_parties,
            solver.name(),
            entries.len()
        );
        Ok(CanonicalTable {
            max_parties,
            solver: solver.name(),
            entries,
        })
    }

    #[cfg(test)]
    pub(crate) fn replace(&mut self, assignment: Assignment) {
        self.entries
            .insert((assignment.parties(), assignment.threshold()), assignment);
    }

    pub fn max_parties(&self) -> u8 {
        self.max_parties
    }

    /// Name of the solver the table was built with.
    pub fn solver(&self) -> &'static str {
        self.solver
    }

    pub fn get(&self, parties: u8, threshold: u8) -> Option<&Assignment> {
        self.entries.get(&(parties, threshold))
    }

    /// Like [`get`](Self::get), but reports a missing entry as a query error.
    pub fn solution(&self, parties: u8, threshold: u8) -> Result<&Assignment, RecoverError> {
        self.get(parties, threshold).ok_or_else(|| {
            RecoverError::query(format!(
                "no canonical solution for N = {parties}, T = {threshold} (table covers N <= {})",
                self.max_parties
            ))
        })
    }

    /// Entries in `(N, T)` order.
    pub fn iter(&self) -> impl Iterator<Item = (&(u8, u8), &Assignment)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Transports the canonical solution for `(parties, active.len())` onto
    /// `active`. Pure: no flow is recomputed.
    ///
    /// # Errors
    ///
    /// Returns `QueryPrecondition` if `active` is not a valid active set or
    /// `parties` exceeds the table.
    pub fn distribute(&self, active: &[u8], parties: u8) -> Result<Distribution, RecoverError> {
        let sorted = validate_active(active, parties)?;
        let canonical = self.solution(parties, sorted.len() as u8)?;
        let permutation = Permutation::for_active(&sorted, parties)?;
        Ok(relabel_shares(canonical.shares(), &permutation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinatorics::{binomial, load_cap};
    use crate::solver::{Dinic, Flow};

    /// Returns a flow with no value at all.
    struct EmptyFlow;

    impl MaxFlowSolver for EmptyFlow {
        fn name(&self) -> &'static str {
            "empty"
        }

        fn solve(&self, _: &FlowNetwork, _: usize, _: usize) -> Result<Flow, RecoverError> {
            Ok(Flow {
                values: Vec::new(),
                total: 0,
            })
        }
    }

    /// Leaves every edge empty.
    struct ZeroFlow;

    impl MaxFlowSolver for ZeroFlow {
        fn name(&self) -> &'static str {
            "zero"
        }

        fn solve(&self, network: &FlowNetwork, _: usize, _: usize) -> Result<Flow, RecoverError> {
            Ok(Flow {
                values: vec![0; network.edges().len()],
                total: 0,
            })
        }
    }

    /// Fills every sink edge without routing anything through participants.
    struct SinkOnlyFlow;

    impl MaxFlowSolver for SinkOnlyFlow {
        fn name(&self) -> &'static str {
            "sink-only"
        }

        fn solve(&self, network: &FlowNetwork, _: usize, _: usize) -> Result<Flow, RecoverError> {
            let mut values = vec![0; network.edges().len()];
            for e in network.sink_edges() {
                values[e] = 1;
            }
            let total = network.secrets().len() as u64;
            Ok(Flow { values, total })
        }
    }

    #[test]
    fn test_default_table_entries() {
        let table = canonical_table().unwrap();
        assert_eq!(table.max_parties(), 6);
        assert_eq!(table.solver(), "edmonds-karp");
        // T ranges over 2..N for N = 3..=6
        assert_eq!(table.len(), 1 + 2 + 3 + 4);
        assert!(table.get(3, 2).is_some());
        assert!(table.get(6, 5).is_some());
        assert!(table.get(6, 6).is_none());
        assert!(table.get(7, 2).is_none());
    }

    #[test]
    fn test_every_entry_partitions_its_universe() {
        let table = canonical_table().unwrap();
        for (&(parties, threshold), assignment) in table.iter() {
            assignment.check_partition().unwrap();
            assert!(assignment.max_load() as u64 <= load_cap(parties, threshold));
            assert_eq!(
                assignment.total_load() as u64,
                binomial(parties as u64, threshold as u64 - 1)
            );
        }
    }

    #[test]
    fn test_single_party_builds_empty_table() {
        let table = CanonicalTable::build(1, &EdmondsKarp).unwrap();
        assert!(table.is_empty());
        let table = CanonicalTable::build(2, &EdmondsKarp).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_out_of_range_bound() {
        assert!(CanonicalTable::build(0, &EdmondsKarp).is_err());
        assert!(CanonicalTable::build(9, &EdmondsKarp).is_err());
    }

    #[test]
    fn test_full_width_table_with_dinic() {
        let table = CanonicalTable::build(8, &Dinic).unwrap();
        assert_eq!(table.len(), (3..=8).map(|n| n - 2).sum::<usize>());
        assert_eq!(table.solver(), "dinic");
    }

    #[test]
    fn test_solve_instance_rejects_invalid_range() {
        assert_eq!(
            solve_instance(5, 5, &EdmondsKarp),
            Err(RecoverError::InvalidRange {
                parties: 5,
                threshold: 5
            })
        );
    }

    #[test]
    fn test_short_flow_is_an_error() {
        assert_eq!(
            CanonicalTable::build(6, &EmptyFlow),
            Err(RecoverError::NonSaturatingFlow {
                parties: 3,
                threshold: 2,
                assigned: 0,
                expected: 3
            })
        );
    }

    #[test]
    fn test_zero_flow_aborts_build() {
        let err = CanonicalTable::build(6, &ZeroFlow).unwrap_err();
        assert!(matches!(err, RecoverError::NonSaturatingFlow { .. }));
        assert!(matches!(
            solve_instance(5, 3, &ZeroFlow),
            Err(RecoverError::NonSaturatingFlow {
                parties: 5,
                threshold: 3,
                assigned: 0,
                expected: 10
            })
        ));
    }

    #[test]
    fn test_sink_only_flow_is_not_a_partition() {
        let err = solve_instance(4, 2, &SinkOnlyFlow).unwrap_err();
        assert!(matches!(
            err,
            RecoverError::PartitionViolation {
                parties: 4,
                threshold: 2,
                ..
            }
        ));
        assert!(matches!(
            CanonicalTable::build(6, &SinkOnlyFlow),
            Err(RecoverError::PartitionViolation { .. })
        ));
    }

    #[test]
    fn test_distribute_beyond_table() {
        let table = CanonicalTable::build(4, &EdmondsKarp).unwrap();
        let err = table.distribute(&[0, 1], 5).unwrap_err();
        assert!(matches!(err, RecoverError::QueryPrecondition { .. }));
    }
}
