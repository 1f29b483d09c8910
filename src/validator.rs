use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::combinatorics::{binomial, combinations, load_cap};
use crate::error::RecoverError;
use crate::secret::{secret_universe, Secret};
use crate::table::CanonicalTable;

/// Summary of an exhaustive validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Number of `(N, T)` instances checked.
    pub instances: usize,
    /// Number of active sets distributed and checked.
    pub queries: usize,
}

/// Distributes every entry of `table` onto every possible active set and
/// checks the result.
///
/// For each `(N, T)` and each `T`-subset of `0..N`, the relabelled
/// assignment must keep every load within `ceil(C(N, T-1) / T)`, hold exactly
/// `C(N, T-1)` secrets in total, cover every secret of the universe once and
/// only hand a secret to one of its members.
pub fn validate(table: &CanonicalTable) -> Result<ValidationReport, RecoverError> {
    let mut report = ValidationReport::default();

    for parties in 1..=table.max_parties() {
        for threshold in 2..parties {
            let universe: BTreeSet<Secret> = secret_universe(parties, threshold).into_iter().collect();
            let cap = load_cap(parties, threshold) as usize;
            let expected = binomial(parties as u64, threshold as u64 - 1) as usize;

            for active in combinations(parties, threshold) {
                let fail = |reason: String| RecoverError::ValidationFailed {
                    parties,
                    threshold,
                    active: active.clone(),
                    reason,
                };

                let distribution = table.distribute(&active, parties)?;

                let max_load = distribution.values().map(Vec::len).max().unwrap_or(0);
                if max_load > cap {
                    return Err(fail(format!("max load {max_load} exceeds cap {cap}")));
                }

                let total: usize = distribution.values().map(Vec::len).sum();
                if total != expected {
                    return Err(fail(format!("total load {total} differs from {expected}")));
                }

                let mut covered = BTreeSet::new();
                for (participant, secrets) in &distribution {
                    if !active.contains(participant) {
                        return Err(fail(format!("inactive participant {participant} holds secrets")));
                    }
                    for secret in secrets {
                        if !secret.contains(*participant) {
                            return Err(fail(format!(
                                "participant {participant} holds {secret} without being a member"
                            )));
                        }
                        covered.insert(secret.clone());
                    }
                }
                if covered != universe {
                    return Err(fail("relabelled secrets do not cover the universe".to_string()));
                }

                report.queries += 1;
            }

            debug!("✅ N = {}, T = {} valid for every active set", parties, threshold);
            report.instances += 1;
        }
    }

    info!(
        "Validated {} instances over {} active sets",
        report.instances, report.queries
    );
    Ok(report)
}
