use std::collections::HashMap;
use std::sync::Arc;

use crate::pmf::Pmf;
use crate::util::{kahan_sum, Int};
use crate::{Error, Result, DROP_CACHE_MAX_ENTRIES};

/// Memoized solver for "keep the best or worst K of N dice".
///
/// Intermediate results are cached for the lifetime of the solver and shared
/// between recursion branches. A running entry count is checked against a
/// fixed ceiling before every allocation; hitting the ceiling is a resource
/// error rather than a degraded answer.
#[derive(Debug, Default)]
pub struct DropSolver {
    cache: HashMap<(Int, Int, Int), Arc<Vec<f64>>>,
    entries: usize,
}

impl DropSolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Distribution of the sum of the best `keep` (or worst `|keep|`, when
    /// `keep` is negative) of `n` dice with `faces` faces. The cached raw
    /// result is trimmed of zero tails, copied, mirrored for negative `keep`,
    /// and renormalized by its accumulated total mass.
    pub fn keep(&mut self, faces: Int, n: Int, keep: Int) -> Result<Pmf> {
        debug_assert!(faces >= 1 && n >= 1 && keep != 0);
        let backwards = keep < 0;
        let solution = self.solve(faces, n, keep.abs())?;
        let first = solution.iter().position(|&p| p != 0.0).unwrap_or(0);
        let last = solution.iter().rposition(|&p| p != 0.0).unwrap_or(0);
        let mut probs = solution[first..=last].to_vec();
        if backwards {
            // Keeping the worst K is the face-value mirror of keeping the
            // best K; the trimmed support is symmetric, so the offset holds.
            probs.reverse();
        }
        let total = kahan_sum(&probs);
        for p in &mut probs {
            *p /= total;
        }
        Ok(Pmf::new(first as Int, probs))
    }

    // Recursion over face values, highest first: choose k of the n remaining
    // dice to show the current face, weight by C(n, k) built incrementally,
    // count min(keep, k) of them toward the sum, and recurse with one face
    // fewer. The result array is indexed directly by the kept sum.
    fn solve(&mut self, faces: Int, n: Int, keep: Int) -> Result<Arc<Vec<f64>>> {
        if let Some(hit) = self.cache.get(&(faces, n, keep)) {
            return Ok(Arc::clone(hit));
        }
        let len = (n * faces + 1) as usize;
        if self.entries + len >= DROP_CACHE_MAX_ENTRIES {
            return Err(Error::DropMemoryLimit {
                entries: self.entries + len,
            });
        }
        self.entries += len;
        let mut out = vec![0.0; len];
        if faces == 1 {
            out[n.min(keep) as usize] = 1.0;
        } else {
            let mut binom = 1.0;
            for k in 0..=n {
                let kept = keep.min(k);
                let tail = self.solve(faces - 1, n - k, keep - kept)?;
                let base = (faces * kept) as usize;
                for (i, &w) in tail.iter().enumerate() {
                    out[base + i] += binom * w;
                }
                binom *= (n - k) as f64;
                binom /= (k + 1) as f64;
            }
        }
        let out = Arc::new(out);
        self.cache.insert((faces, n, keep), Arc::clone(&out));
        Ok(out)
    }
}
