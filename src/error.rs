use thiserror::Error;

/// Errors raised while building, querying or validating the sharing table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoverError {
    /// `(N, T)` lies outside `1 <= N <= 8`, `2 <= T < N`.
    #[error("invalid range: parties = {parties}, threshold = {threshold}")]
    InvalidRange { parties: u8, threshold: u8 },

    /// The solver left some secrets without a responsible participant.
    #[error(
        "flow does not saturate the sink for parties = {parties}, threshold = {threshold}: \
         {assigned} of {expected} secrets assigned"
    )]
    NonSaturatingFlow {
        parties: u8,
        threshold: u8,
        assigned: usize,
        expected: usize,
    },

    /// An active set that is not a valid `T`-subset of `[0, N)`.
    #[error("invalid query: {reason}")]
    QueryPrecondition { reason: String },

    /// Source or sink handed to a solver does not exist in the network.
    #[error("node {node} is not part of a network with {node_count} nodes")]
    InvalidNode { node: usize, node_count: usize },

    /// Extracted assignment does not cover every secret exactly once.
    #[error("assignment for parties = {parties}, threshold = {threshold} is not a partition: {reason}")]
    PartitionViolation {
        parties: u8,
        threshold: u8,
        reason: String,
    },

    /// The exhaustive self-check rejected a relabelled assignment.
    #[error(
        "validation failed for parties = {parties}, threshold = {threshold}, \
         active = {active:?}: {reason}"
    )]
    ValidationFailed {
        parties: u8,
        threshold: u8,
        active: Vec<u8>,
        reason: String,
    },
}

impl RecoverError {
    pub(crate) fn query(reason: impl Into<String>) -> Self {
        RecoverError::QueryPrecondition {
            reason: reason.into(),
        }
    }
}
