//! Transport of canonical solutions onto arbitrary active sets.
//!
//! The canonical solution for `(N, T)` assumes participants `0..T` are the
//! active quorum. Any other quorum is isomorphic to it: sort the active
//! participants, append the inactive ones in natural order, and the resulting
//! permutation `p` carries canonical participant `x` to `p[x]` and every
//! canonical secret `{i, ...}` to `{p[i], ...}`.

use std::collections::BTreeMap;

use crate::constants::{MAX_SUPPORTED_PARTIES, MIN_THRESHOLD};
use crate::error::RecoverError;
use crate::secret::Secret;
use crate::table::{canonical_table, CanonicalTable};

/// Secrets each active participant is responsible for, keyed by participant
/// index in the original `N`-index space.
pub type Distribution = BTreeMap<u8, Vec<Secret>>;

/// A bijection of `0..N`, stored as the image of every canonical index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    images: Vec<u8>,
}

impl Permutation {
    pub fn identity(parties: u8) -> Self {
        Permutation {
            images: (0..parties).collect(),
        }
    }

    /// Builds the permutation that moves the canonical quorum `0..T` onto
    /// `active`: sorted active participants first, then every inactive
    /// participant in natural order.
    ///
    /// # Errors
    ///
    /// Returns `QueryPrecondition` if `active` is not a valid `T`-subset of
    /// `0..parties` with `2 <= T < parties`.
    pub fn for_active(active: &[u8], parties: u8) -> Result<Self, RecoverError> {
        let sorted = validate_active(active, parties)?;
        let mut images = sorted.clone();
        images.extend((0..parties).filter(|i| sorted.binary_search(i).is_err()));
        Ok(Permutation { images })
    }

    /// Image of canonical index `i`.
    pub fn apply(&self, i: u8) -> u8 {
        self.images[i as usize]
    }

    pub fn inverse(&self) -> Permutation {
        let mut images = vec![0u8; self.images.len()];
        for (canonical, &image) in self.images.iter().enumerate() {
            images[image as usize] = canonical as u8;
        }
        Permutation { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[u8] {
        &self.images
    }
}

/// Checks that `active` is a duplicate-free `T`-subset of `0..parties` with
/// `2 <= T < parties`, and returns it sorted.
pub fn validate_active(active: &[u8], parties: u8) -> Result<Vec<u8>, RecoverError> {
    if parties == 0 || parties > MAX_SUPPORTED_PARTIES {
        return Err(RecoverError::query(format!(
            "parties must be in 1..={MAX_SUPPORTED_PARTIES}, got {parties}"
        )));
    }

    let mut sorted = active.to_vec();
    sorted.sort_unstable();

    if let Some(&bad) = sorted.iter().find(|&&i| i >= parties) {
        return Err(RecoverError::query(format!(
            "participant {bad} is outside 0..{parties}"
        )));
    }
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return Err(RecoverError::query(format!(
            "active set {active:?} contains duplicates"
        )));
    }

    let threshold = sorted.len();
    if threshold < MIN_THRESHOLD as usize || threshold >= parties as usize {
        return Err(RecoverError::query(format!(
            "active set of size {threshold} is outside {MIN_THRESHOLD}..{parties}"
        )));
    }

    Ok(sorted)
}

/// Decodes an active set given as a bitmask (bit `j` set iff participant `j`
/// is active).
///
/// # Examples
///
/// ```rust
/// use shard_recover::distribute::active_from_mask;
///
/// assert_eq!(active_from_mask(0b1101, 4).unwrap(), vec![0, 2, 3]);
/// assert!(active_from_mask(0b1_0001, 4).is_err());
/// ```
pub fn active_from_mask(mask: u8, parties: u8) -> Result<Vec<u8>, RecoverError> {
    let active = Secret::from_mask(mask).members().to_vec();
    validate_active(&active, parties)?;
    Ok(active)
}

/// Applies `permutation` to both the participant keys and every secret of a
/// share map.
pub fn relabel_shares<'a, I, S>(shares: I, permutation: &Permutation) -> Distribution
where
    I: IntoIterator<Item = (&'a u8, S)>,
    S: IntoIterator<Item = &'a Secret>,
{
    shares
        .into_iter()
        .map(|(&participant, secrets)| {
            let relabelled = secrets
                .into_iter()
                .map(|secret| secret.relabel(permutation))
                .collect();
            (permutation.apply(participant), relabelled)
        })
        .collect()
}

/// Distributes the canonical solution for `(parties, active.len())` onto
/// `active`, using the process-wide table.
///
/// # Examples
///
/// ```rust
/// use shard_recover::distribute::distribute;
///
/// let distribution = distribute(&[1, 3], 4).unwrap();
/// assert_eq!(distribution.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
/// let total: usize = distribution.values().map(Vec::len).sum();
/// assert_eq!(total, 4);
/// ```
pub fn distribute(active: &[u8], parties: u8) -> Result<Distribution, RecoverError> {
    canonical_table()?.distribute(active, parties)
}

/// Bitmask-encoded secrets that `party` covers when `active_mask` is the
/// active set.
///
/// # Errors
///
/// Returns `QueryPrecondition` if `party` is not a member of `active_mask`, or
/// if `active_mask` is not a valid active set for `parties`.
pub fn share_masks_for(
    table: &CanonicalTable,
    party: u8,
    active_mask: u8,
    parties: u8,
) -> Result<Vec<u8>, RecoverError> {
    let active = active_from_mask(active_mask, parties)?;
    let Some(position) = active.iter().position(|&p| p == party) else {
        return Err(RecoverError::query(format!(
            "participant {party} is not part of the active set {active:?}"
        )));
    };

    let permutation = Permutation::for_active(&active, parties)?;
    let canonical = table.solution(parties, active.len() as u8)?;
    let masks = canonical
        .shares_of(position as u8)
        .map(|secret| Secret::relabel_mask(secret.to_mask(), &permutation))
        .collect();
    Ok(masks)
}
