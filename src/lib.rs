//! # Balanced Recovery Patterns for Threshold Secret Sharing
//!
//! This library computes, for every pair `(N, T)` with `2 <= T < N`, which active participant is
//! responsible for which minimal coalition when any `T` of `N` participants come together to
//! recover a shared secret.
//!
//! ## The Problem
//!
//! In a replicated `T`-of-`N` sharing, one share exists per *minimal coalition*: every subset of
//! `N - T + 1` participants. There are `C(N, N - T + 1) = C(N, T - 1)` of them. Any `T` active
//! participants meet every coalition (the `T - 1` inactive ones cannot fill a coalition alone), so
//! the active quorum can always cover all shares between them. The question is *who* covers which
//! share so that the work is spread as evenly as possible:
//!
//! ```ignore
//! load(i) <= ceil(C(N, T - 1) / T)     for every active participant i
//! sum(load(i)) == C(N, T - 1)
//! ```
//!
//! ### The Flow Formulation
//!
//! The canonical instance takes participants `0..T` as the active quorum. A flow network feeds each
//! of them `ceil(C(N, T - 1) / T)` units from the source, connects participant `i` to every
//! coalition containing `i` with capacity 1, and drains each coalition into the sink with capacity
//! 1. A saturating integral maximum flow is exactly a balanced assignment.
//!
//! ### Relabelling
//!
//! Every other active set is isomorphic to the canonical one. Sorting the active participants and
//! appending the inactive ones gives a permutation `p`; canonical participant `x` becomes `p[x]`
//! and canonical coalition `{i, ...}` becomes `{p[i], ...}`. No flow has to be recomputed per
//! query.
//!
//! ## Usage in the Code
//!
//! ### Example: Distributing a Quorum
//!
//! ```rust
//! use shard_recover::distribute::distribute;
//! use shard_recover::combinatorics::binomial;
//!
//! // participants 1, 2 and 4 of 5 are active
//! let distribution = distribute(&[1, 2, 4], 5).unwrap();
//! let total: usize = distribution.values().map(Vec::len).sum();
//! assert_eq!(total as u64, binomial(5, 2));
//! ```
//!
//! ### Example: Building a Table
//!
//! ```rust
//! use shard_recover::solver::Dinic;
//! use shard_recover::table::CanonicalTable;
//! use shard_recover::validator::validate;
//!
//! let table = CanonicalTable::build(8, &Dinic).unwrap();
//! validate(&table).unwrap();
//! ```
//!
//! ## Modules
//!
//! - `combinatorics`: binomial coefficients and combination enumeration.
//! - `secret`: minimal coalitions and their bitmask encoding.
//! - `network`: the flow network for one `(N, T)` pair.
//! - `solver`: the max-flow interface and its implementations.
//! - `assignment`: extraction of the assignment from a solved flow.
//! - `table`: the canonical solution table.
//! - `distribute`: relabelling canonical solutions onto arbitrary active sets.
//! - `validator`: the exhaustive self-check.
//! - `report`: text and JSON rendering of the table.
//! - `config`: layered configuration.

/// The `combinatorics` module provides exact binomial coefficients, the per-participant load cap
/// and lexicographic enumeration of combinations.
pub mod combinatorics;

/// The `secret` module defines minimal coalitions, their bitmask encoding and relabelling.
pub mod secret;

/// The `network` module builds the flow network that encodes the balanced assignment problem for
/// one `(N, T)` pair.
pub mod network;

/// The `solver` module defines the `MaxFlowSolver` trait together with Edmonds-Karp and Dinic
/// implementations.
pub mod solver;

/// The `assignment` module reads a solved flow back into per-participant secret sets and checks
/// that they partition the universe.
pub mod assignment;

/// The `table` module holds the canonical solutions for every supported `(N, T)`, including the
/// process-wide table built on first access.
pub mod table;

/// The `distribute` module transports canonical solutions onto arbitrary active sets through a
/// permutation of participant indices.
pub mod distribute;

/// The `validator` module exhaustively checks every table entry against every possible active set.
pub mod validator;

/// The `report` module renders the table for downstream consumers.
pub mod report;

/// The `config` module loads settings from a TOML file and the environment.
pub mod config;

/// The `error` module defines the library's error type.
pub mod error;

/// The `constants` module defines various constants used in the library.
pub mod constants;
