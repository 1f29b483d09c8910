/// Computes the binomial coefficient `C(n, k)` exactly.
///
/// Returns `0` when `k > n`.
///
/// # Examples
///
/// ```rust
/// use shard_recover::combinatorics::binomial;
///
/// assert_eq!(binomial(6, 3), 20);
/// assert_eq!(binomial(3, 4), 0);
/// ```
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    // result * (n - i) is always divisible by (i + 1) at this point
    (0..k).fold(1, |result, i| result * (n - i) / (i + 1))
}

/// Integer division rounding towards positive infinity, `None` for a zero
/// denominator.
pub fn div_ceil(numerator: u64, denominator: u64) -> Option<u64> {
    let quotient = numerator.checked_div(denominator)?;
    Some(quotient + u64::from(numerator % denominator != 0))
}

/// The per-participant load cap `ceil(C(N, T-1) / T)`.
///
/// A zero threshold has no participants to load and yields `0`.
pub fn load_cap(parties: u8, threshold: u8) -> u64 {
    let Some(below) = threshold.checked_sub(1) else {
        return 0;
    };
    let total = binomial(parties as u64, below as u64);
    div_ceil(total, threshold as u64).unwrap_or(0)
}

/// Enumerates every `k`-combination of `0..n` in lexicographic order.
///
/// The empty combination is the single result for `k == 0`, and no
/// combination exists for `k > n`.
///
/// # Examples
///
/// ```rust
/// use shard_recover::combinatorics::combinations;
///
/// let pairs = combinations(3, 2);
/// assert_eq!(pairs, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
/// ```
pub fn combinations(n: u8, k: u8) -> Vec<Vec<u8>> {
    if k > n {
        return Vec::new();
    }

    let k = k as usize;
    let mut indices: Vec<u8> = (0..k as u8).collect();
    let mut result = Vec::with_capacity(binomial(n as u64, k as u64) as usize);

    loop {
        result.push(indices.clone());

        // rightmost position that has not reached its maximum value
        let Some(i) = (0..k).rev().find(|&i| indices[i] as usize != i + n as usize - k) else {
            break;
        };
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }

    result
}
