//! Bounded-descent Collatz trajectory evaluation
//!
//! For each candidate seed the search only needs to know that the hailstone
//! trajectory eventually drops below the seed itself. Every smaller odd
//! number has already been visited, so descent below the seed is sufficient
//! evidence that the candidate is not a counterexample.

use num_bigint::BigUint;
use num_integer::Integer;
use tracing::debug;

/// Outcome of evaluating one candidate seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descent {
    /// First trajectory value strictly below the seed
    pub terminal: BigUint,
    /// Number of halving/tripling steps taken to get there
    pub steps: u64,
}

/// Drive the trajectory of `seed` until it falls below `seed`.
///
/// Rule: if x is even and x >= seed, halve it; if x < seed, stop;
/// otherwise (x odd, x >= seed) apply x = 3x + 1.
///
/// Termination is the standard Collatz behavior, assumed rather than
/// proven. Callers must pass an odd seed >= 3: the seed 1 cycles
/// (1 -> 4 -> 2 -> 1) without ever dropping below itself.
pub fn descend(seed: &BigUint) -> Descent {
    debug_assert!(seed.is_odd(), "descend requires an odd seed");
    debug_assert!(*seed >= BigUint::from(3u32), "descend requires seed >= 3");

    let mut x = seed.clone();
    let mut steps = 0u64;
    loop {
        if x.is_even() && x >= *seed {
            x >>= 1u32;
        } else if x < *seed {
            break;
        } else {
            x = &x * 3u32 + 1u32;
        }
        steps += 1;
    }

    debug!(%seed, terminal = %x, steps, "descend: trajectory dropped below seed");
    Descent { terminal: x, steps }
}
