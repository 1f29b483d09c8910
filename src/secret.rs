use core::fmt;

use crate::combinatorics::combinations;
use crate::constants::MAX_SUPPORTED_PARTIES;
use crate::distribute::Permutation;
use crate::error::RecoverError;

/// A minimal coalition: a set of participant indices of size `N - T + 1`.
///
/// Members are kept sorted and free of duplicates, so two secrets holding the
/// same participants compare equal and hash identically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Secret {
    members: Vec<u8>,
}

impl Secret {
    /// Builds a secret from arbitrary participant indices.
    ///
    /// # Errors
    ///
    /// Returns `QueryPrecondition` if an index does not fit in a `u8` bitmask.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shard_recover::secret::Secret;
    ///
    /// let secret = Secret::new([2, 0]).unwrap();
    /// assert_eq!(secret.members(), &[0, 2]);
    /// assert_eq!(secret.to_mask(), 5);
    /// ```
    pub fn new(members: impl IntoIterator<Item = u8>) -> Result<Self, RecoverError> {
        let members: Vec<u8> = members.into_iter().collect();
        if let Some(&bad) = members.iter().find(|&&m| m >= MAX_SUPPORTED_PARTIES) {
            return Err(RecoverError::query(format!(
                "participant {bad} does not fit in a {MAX_SUPPORTED_PARTIES}-bit mask"
            )));
        }
        Ok(Secret::from_unsorted(members))
    }

    pub(crate) fn from_unsorted(mut members: Vec<u8>) -> Self {
        members.sort_unstable();
        members.dedup();
        Secret { members }
    }

    /// Decodes a bitmask, bit `i` set meaning participant `i` is a member.
    pub fn from_mask(mask: u8) -> Self {
        let members = (0..MAX_SUPPORTED_PARTIES)
            .filter(|&i| mask & (1 << i) != 0)
            .collect();
        Secret { members }
    }

    /// Sorted participant indices.
    pub fn members(&self) -> &[u8] {
        &self.members
    }

    pub fn contains(&self, participant: u8) -> bool {
        self.members.binary_search(&participant).is_ok()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Encodes the secret as a bitmask: bit `i` is set iff participant `i`
    /// belongs to the coalition.
    pub fn to_mask(&self) -> u8 {
        self.members.iter().fold(0u8, |mask, &i| mask | (1 << i))
    }

    /// Maps every member `i` to `permutation[i]`.
    pub fn relabel(&self, permutation: &Permutation) -> Secret {
        Secret::from_unsorted(
            self.members
                .iter()
                .map(|&i| permutation.apply(i))
                .collect(),
        )
    }

    /// Relabels a bitmask-encoded secret without decoding it first.
    ///
    /// Bits at or above the permutation's length are dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shard_recover::distribute::Permutation;
    /// use shard_recover::secret::Secret;
    ///
    /// // active = {1, 3} out of 4: canonical 0 -> 1, 1 -> 3, 2 -> 0, 3 -> 2
    /// let permutation = Permutation::for_active(&[3, 1], 4).unwrap();
    /// assert_eq!(Secret::relabel_mask(0b0011, &permutation), 0b1010);
    /// ```
    pub fn relabel_mask(mask: u8, permutation: &Permutation) -> u8 {
        (0..permutation.len() as u8)
            .filter(|&i| mask & (1 << i) != 0)
            .fold(0u8, |relabelled, i| relabelled | (1 << permutation.apply(i)))
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{member}")?;
        }
        write!(f, "}}")
    }
}

/// Every minimal coalition for `(N, T)`: all `(N - T + 1)`-combinations of
/// `0..N`, in lexicographic order. The position of a secret in this list is
/// its index in the flow network.
pub fn secret_universe(parties: u8, threshold: u8) -> Vec<Secret> {
    let size = (parties + 1).saturating_sub(threshold);
    combinations(parties, size)
        .into_iter()
        .map(|members| Secret { members })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinatorics::binomial;

    #[test]
    fn test_mask_encoding() {
        assert_eq!(Secret::new([0, 2]).unwrap().to_mask(), 5);
        assert_eq!(Secret::new([1, 2, 3]).unwrap().to_mask(), 14);
        assert_eq!(Secret::new([7]).unwrap().to_mask(), 128);
        assert_eq!(Secret::new([0u8; 0]).unwrap().to_mask(), 0);
    }

    #[test]
    fn test_mask_decoding() {
        assert_eq!(Secret::from_mask(14).members(), &[1, 2, 3]);
        assert_eq!(Secret::from_mask(0b1000_0001).members(), &[0, 7]);
        for mask in 0..=u8::MAX {
            assert_eq!(Secret::from_mask(mask).to_mask(), mask);
        }
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let secret = Secret::new([3, 1, 3, 0]).unwrap();
        assert_eq!(secret.members(), &[0, 1, 3]);
        assert!(secret.contains(3));
        assert!(!secret.contains(2));
        assert_eq!(secret.to_string(), "{0, 1, 3}");
    }

    #[test]
    fn test_new_rejects_wide_members() {
        assert!(Secret::new([0, 8]).is_err());
    }

    #[test]
    fn test_universe_sizes() {
        for parties in 3..=6u8 {
            for threshold in 2..parties {
                let universe = secret_universe(parties, threshold);
                let expected = binomial(parties as u64, threshold as u64 - 1);
                assert_eq!(universe.len() as u64, expected);
                assert!(universe
                    .iter()
                    .all(|s| s.len() == (parties - threshold + 1) as usize));
            }
        }
    }

    #[test]
    fn test_universe_for_three_parties() {
        let masks: Vec<u8> = secret_universe(3, 2).iter().map(Secret::to_mask).collect();
        assert_eq!(masks, vec![0b011, 0b101, 0b110]);
    }

    #[test]
    fn test_relabel_matches_relabel_mask() {
        let permutation = Permutation::for_active(&[4, 1, 2], 5).unwrap();
        for secret in secret_universe(5, 3) {
            assert_eq!(
                secret.relabel(&permutation).to_mask(),
                Secret::relabel_mask(secret.to_mask(), &permutation)
            );
        }
    }
}
