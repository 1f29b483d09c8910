use std::collections::{BTreeMap, BTreeSet};

use crate::combinatorics::{binomial, load_cap};
use crate::error::RecoverError;
use crate::network::FlowNetwork;
use crate::secret::{secret_universe, Secret};
use crate::solver::Flow;

/// Which canonical participant (`0..T`) is responsible for which minimal
/// coalition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    parties: u8,
    threshold: u8,
    shares: BTreeMap<u8, BTreeSet<Secret>>,
}

impl Assignment {
    /// Reads the participant → secret edges of a solved network. An edge
    /// carrying one unit of flow assigns the secret to the participant.
    ///
    /// Nothing else is inspected; use [`ensure_saturated`] first to make sure
    /// every secret received a participant.
    pub fn extract(network: &FlowNetwork, flow: &Flow) -> Self {
        let mut shares = BTreeMap::new();
        for i in 0..network.threshold() {
            let assigned: BTreeSet<Secret> = network
                .secrets()
                .iter()
                .enumerate()
                .filter(|&(s, _)| {
                    network
                        .edge_between(network.participant_node(i), network.secret_node(s))
                        .map_or(false, |e| flow.on(e) == 1)
                })
                .map(|(_, secret)| secret.clone())
                .collect();
            shares.insert(i, assigned);
        }

        Assignment {
            parties: network.parties(),
            threshold: network.threshold(),
            shares,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_shares(
        parties: u8,
        threshold: u8,
        shares: BTreeMap<u8, BTreeSet<Secret>>,
    ) -> Self {
        Assignment {
            parties,
            threshold,
            shares,
        }
    }

    pub fn parties(&self) -> u8 {
        self.parties
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn shares(&self) -> &BTreeMap<u8, BTreeSet<Secret>> {
        &self.shares
    }

    /// Secrets assigned to canonical participant `participant`, in order.
    pub fn shares_of(&self, participant: u8) -> impl Iterator<Item = &Secret> + '_ {
        self.shares.get(&participant).into_iter().flatten()
    }

    pub fn load(&self, participant: u8) -> usize {
        self.shares.get(&participant).map_or(0, BTreeSet::len)
    }

    pub fn max_load(&self) -> usize {
        self.shares.values().map(BTreeSet::len).max().unwrap_or(0)
    }

    pub fn total_load(&self) -> usize {
        self.shares.values().map(BTreeSet::len).sum()
    }

    /// Bitmask-encoded secrets of every participant, participant `i` at
    /// position `i`.
    pub fn to_masks(&self) -> Vec<Vec<u8>> {
        self.shares
            .values()
            .map(|secrets| secrets.iter().map(Secret::to_mask).collect())
            .collect()
    }

    /// Checks that the sets partition the full secret universe and stay
    /// within the load cap.
    pub fn check_partition(&self) -> Result<(), RecoverError> {
        let violation = |reason: String| RecoverError::PartitionViolation {
            parties: self.parties,
            threshold: self.threshold,
            reason,
        };

        let mut seen = BTreeSet::new();
        for (participant, secrets) in &self.shares {
            for secret in secrets {
                if !secret.contains(*participant) {
                    return Err(violation(format!(
                        "participant {participant} holds {secret} without being a member"
                    )));
                }
                if !seen.insert(secret) {
                    return Err(violation(format!("{secret} is assigned twice")));
                }
            }
        }

        let universe = secret_universe(self.parties, self.threshold);
        if let Some(missing) = universe.iter().find(|s| !seen.contains(s)) {
            return Err(violation(format!("{missing} is not assigned")));
        }
        if seen.len() != universe.len() {
            return Err(violation(format!(
                "{} secrets assigned, universe holds {}",
                seen.len(),
                universe.len()
            )));
        }

        let expected = binomial(self.parties as u64, self.threshold as u64 - 1) as usize;
        if self.total_load() != expected {
            return Err(violation(format!(
                "total load {} differs from C(N, T-1) = {}",
                self.total_load(),
                expected
            )));
        }

        let cap = load_cap(self.parties, self.threshold) as usize;
        if self.max_load() > cap {
            return Err(violation(format!(
                "max load {} exceeds cap {}",
                self.max_load(),
                cap
            )));
        }

        Ok(())
    }
}

/// Fails with `NonSaturatingFlow` unless the flow covers every edge of the
/// network and every secret → sink edge carries one unit of flow.
pub fn ensure_saturated(network: &FlowNetwork, flow: &Flow) -> Result<(), RecoverError> {
    let expected = network.secrets().len();
    let assigned = if flow.values.len() == network.edges().len() {
        network.sink_edges().filter(|&e| flow.on(e) == 1).count()
    } else {
        0
    };
    if assigned == expected {
        Ok(())
    } else {
        Err(RecoverError::NonSaturatingFlow {
            parties: network.parties(),
            threshold: network.threshold(),
            assigned,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SINK, SOURCE};
    use crate::solver::{EdmondsKarp, MaxFlowSolver};

    fn solved(parties: u8, threshold: u8) -> (FlowNetwork, Flow) {
        let network = FlowNetwork::build(parties, threshold).unwrap();
        let flow = EdmondsKarp.solve(&network, SOURCE, SINK).unwrap();
        (network, flow)
    }

    #[test]
    fn test_three_parties_threshold_two() {
        let (network, flow) = solved(3, 2);
        ensure_saturated(&network, &flow).unwrap();
        let assignment = Assignment::extract(&network, &flow);
        assignment.check_partition().unwrap();

        assert_eq!(assignment.total_load(), 3);
        assert!(assignment.max_load() <= 2);
        // {1, 2} excludes participant 0, so participant 1 must cover it
        let twelve = Secret::new([1, 2]).unwrap();
        assert!(assignment.shares_of(1).any(|s| *s == twelve));
    }

    #[test]
    fn test_four_parties_threshold_three_is_even() {
        let (network, flow) = solved(4, 3);
        let assignment = Assignment::extract(&network, &flow);
        assignment.check_partition().unwrap();
        for i in 0..3 {
            assert_eq!(assignment.load(i), 2);
        }
    }

    #[test]
    fn test_zero_flow_is_not_saturated() {
        let network = FlowNetwork::build(4, 2).unwrap();
        let flow = Flow {
            values: vec![0; network.edges().len()],
            total: 0,
        };
        assert_eq!(
            ensure_saturated(&network, &flow),
            Err(RecoverError::NonSaturatingFlow {
                parties: 4,
                threshold: 2,
                assigned: 0,
                expected: 4
            })
        );

        let assignment = Assignment::extract(&network, &flow);
        assert_eq!(assignment.total_load(), 0);
        assert!(assignment.check_partition().is_err());
    }

    #[test]
    fn test_masks_layout() {
        let (network, flow) = solved(5, 4);
        let assignment = Assignment::extract(&network, &flow);
        let masks = assignment.to_masks();
        assert_eq!(masks.len(), 4);
        for (i, row) in masks.iter().enumerate() {
            assert!(row.iter().all(|m| m & (1 << i) != 0));
            assert!(row.iter().all(|m| m.count_ones() == 2));
        }
    }
}
