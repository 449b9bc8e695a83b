use itertools::Itertools;
use num::complex::Complex64;

use crate::spectrum;
use crate::util::{cumsum_in_place, kahan_sum, Int, Kahan};
use crate::{Error, Result};

/// A probability mass function over the contiguous integer support
/// `[offset, offset + probs.len() - 1]`.
///
/// Invariants: `probs` is non-empty, entries are non-negative and total 1.0
/// within float tolerance. Leading and trailing zero entries are not trimmed
/// after every operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Pmf {
    offset: Int,
    probs: Vec<f64>,
}

impl Pmf {
    pub(crate) fn new(offset: Int, probs: Vec<f64>) -> Self {
        debug_assert!(!probs.is_empty());
        Self { offset, probs }
    }

    pub(crate) fn point(value: Int) -> Self {
        Self::new(value, vec![1.0])
    }

    /// Builds a PMF from raw non-negative weights, normalized to total mass
    /// 1. Returns `None` on an empty slice, a negative or non-finite weight,
    /// or a zero total.
    #[must_use]
    pub fn from_weights(offset: Int, mut weights: Vec<f64>) -> Option<Self> {
        if weights.is_empty() || weights.iter().any(|x| !x.is_finite() || *x < 0.0) {
            return None;
        }
        let total = kahan_sum(&weights);
        if total <= 0.0 {
            return None;
        }
        for w in &mut weights {
            *w /= total;
        }
        Some(Self::new(offset, weights))
    }

    /// The PMF of the sum of `count` uniform dice on `[1, faces]`, computed
    /// as the inverse transform of the single-die spectrum raised to the
    /// `count`-th power.
    #[must_use]
    pub fn ndm(count: Int, faces: Int) -> Self {
        if faces == 1 {
            return Self::point(count);
        }
        let n = count as usize;
        let m = faces as usize;
        let len = n * m;
        // Past 2^52 the exact outcome count faces^count is not representable
        // in a double; start from the normalized die and skip the integer
        // rounding below.
        let exact = count as f64 * (faces as f64).log2() <= 52.0;
        let mut buf = vec![0.0; len];
        buf[..m].fill(if exact { 1.0 } else { 1.0 / faces as f64 });
        let single = spectrum::forward(buf);
        let mut acc = vec![Complex64::new(0.0, 0.0); single.len()];
        spectrum::pow_rotate_acc(&mut acc, &single, n as u64, 1.0, 0, len);
        let mut probs = spectrum::inverse(acc, len);
        probs.truncate(n * (m - 1) + 1);
        if exact {
            let total = (faces as f64).powi(count as i32);
            for p in &mut probs {
                *p = p.round() / total;
            }
        }
        Self::new(count, probs)
    }

    #[must_use]
    pub fn offset(&self) -> Int {
        self.offset
    }

    #[must_use]
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    #[must_use]
    pub fn max_value(&self) -> Int {
        self.offset + self.probs.len() as Int - 1
    }

    /// Total mass; 1.0 up to accumulated float error.
    #[must_use]
    pub fn mass(&self) -> f64 {
        kahan_sum(&self.probs)
    }

    #[must_use]
    pub fn mass_at(&self, value: Int) -> f64 {
        if value < self.offset || value > self.max_value() {
            return 0.0;
        }
        self.probs[(value - self.offset) as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Int, f64)> + '_ {
        let offset = self.offset;
        self.probs
            .iter()
            .enumerate()
            .map(move |(i, &p)| (offset + i as Int, p))
    }

    pub(crate) fn cumulative(&self) -> Vec<f64> {
        let mut cdf = self.probs.clone();
        cumsum_in_place(&mut cdf);
        cdf
    }

    /// Shifts the support; never reallocates.
    #[must_use]
    pub fn shift(mut self, by: Int) -> Self {
        self.offset += by;
        self
    }

    /// Mirrors the support about zero.
    #[must_use]
    pub fn negate(mut self) -> Self {
        self.offset = -self.max_value();
        self.probs.reverse();
        self
    }

    /// Sum of two independent variables: zero-pad, transform, multiply per
    /// bin, transform back. Offsets add.
    #[must_use]
    pub fn convolve(self, rhs: Self) -> Self {
        let len = self.probs.len() + rhs.probs.len();
        let offset = self.offset + rhs.offset;
        let mut x = self.probs;
        x.resize(len, 0.0);
        let mut y = rhs.probs;
        y.resize(len, 0.0);
        let mut sx = spectrum::forward(x);
        let sy = spectrum::forward(y);
        spectrum::multiply(&mut sx, &sy);
        let mut probs = spectrum::inverse(sx, len);
        probs.truncate(len - 1);
        Self::new(offset, probs)
    }

    /// Sum of `n` independent copies; negative `n` sums copies of the
    /// negated variable. `n` must be nonzero.
    #[must_use]
    pub fn self_convolve(self, n: Int) -> Self {
        debug_assert_ne!(n, 0);
        let offset = if n < 0 {
            n * self.max_value()
        } else {
            n * self.offset
        };
        let mut probs = self.probs;
        if n < 0 {
            probs.reverse();
        }
        let count = n.unsigned_abs();
        if count == 1 || probs.len() == 1 {
            // a point mass stays a point mass under summation
            return Self::new(offset, probs);
        }
        let len = count as usize * (probs.len() - 1) + 1;
        probs.resize(len, 0.0);
        let single = spectrum::forward(probs);
        let mut acc = vec![Complex64::new(0.0, 0.0); single.len()];
        spectrum::pow_rotate_acc(&mut acc, &single, count, 1.0, 0, len);
        Self::new(offset, spectrum::inverse(acc, len))
    }

    /// Scales the variable by a nonzero integer, inserting zeros between
    /// entries instead of transforming. Negative factors mirror first.
    #[must_use]
    pub fn grow(self, n: Int) -> Self {
        debug_assert_ne!(n, 0);
        let offset = if n < 0 {
            self.max_value() * n
        } else {
            self.offset * n
        };
        let mut src = self.probs;
        if n < 0 {
            src.reverse();
        }
        let step = n.unsigned_abs() as usize;
        let mut probs = vec![0.0; step * (src.len() - 1) + 1];
        for (i, p) in src.into_iter().enumerate() {
            probs[i * step] = p;
        }
        Self::new(offset, probs)
    }

    /// Product of two independent variables, accumulated directly over the
    /// support pairs. Output bounds come from the four corner products.
    #[must_use]
    pub fn product(self, rhs: Self) -> Self {
        let corners = [
            self.offset * rhs.offset,
            self.offset * rhs.max_value(),
            self.max_value() * rhs.offset,
            self.max_value() * rhs.max_value(),
        ];
        let (lower, upper) = corners
            .into_iter()
            .minmax()
            .into_option()
            .expect("four corner products");
        let mut probs = vec![0.0; (upper - lower + 1) as usize];
        for (vx, px) in self.iter() {
            for (vy, py) in rhs.iter() {
                probs[(vx * vy - lower) as usize] += px * py;
            }
        }
        Self::new(lower, probs)
    }

    /// Roll-and-sum (`X @ Y`): sample the left variable, then sum that many
    /// independent copies of the right one. Each left value accumulates into
    /// one shared spectrum through the rotation primitive, so the right
    /// operand is transformed at most twice (once plain, once mirrored for
    /// negative counts).
    #[must_use]
    pub fn roll_sum(self, rhs: Self) -> Self {
        let ymin = rhs.offset;
        let ymax = rhs.max_value();
        let mut lower = Int::MAX;
        let mut upper = Int::MIN;
        for (n, p) in self.iter() {
            if p <= 0.0 {
                continue;
            }
            let (lo, hi) = if n >= 0 {
                (n * ymin, n * ymax)
            } else {
                (n * ymax, n * ymin)
            };
            lower = lower.min(lo);
            upper = upper.max(hi);
        }
        let len = (upper - lower + 1) as usize;
        let mut acc = vec![Complex64::new(0.0, 0.0); len / 2 + 1];
        let mut transformed = false;
        let mut plain = None;
        let mut mirrored = None;
        let mut zero_mass = 0.0;
        for (n, p) in self.iter() {
            if p <= 0.0 {
                continue;
            }
            if n == 0 {
                zero_mass += p;
                continue;
            }
            let single = if n > 0 {
                plain.get_or_insert_with(|| {
                    let mut buf = rhs.probs.clone();
                    buf.resize(len, 0.0);
                    spectrum::forward(buf)
                })
            } else {
                mirrored.get_or_insert_with(|| {
                    let mut buf: Vec<f64> = rhs.probs.iter().rev().copied().collect();
                    buf.resize(len, 0.0);
                    spectrum::forward(buf)
                })
            };
            // n-fold sums start at n*ymin (or n*ymax mirrored); rotate each
            // contribution into place relative to the output origin.
            let shift = if n > 0 { n * ymin } else { n * ymax } - lower;
            spectrum::pow_rotate_acc(&mut acc, single, n.unsigned_abs(), p, shift, len);
            transformed = true;
        }
        let mut probs = if transformed {
            spectrum::inverse(acc, len)
        } else {
            vec![0.0; len]
        };
        if zero_mass > 0.0 {
            probs[(-lower) as usize] += zero_mass;
        }
        Self::new(lower, probs)
    }

    /// Truncating integer division by a nonzero constant; each support value
    /// maps to one destination bucket.
    #[must_use]
    pub fn div_scalar(self, n: Int) -> Self {
        debug_assert_ne!(n, 0);
        let negate = n < 0;
        let n = n.abs();
        let start = self.offset / n;
        let end = self.max_value() / n;
        let mut probs = vec![0.0; (end - start + 1) as usize];
        for (v, p) in self.iter() {
            probs[(v / n - start) as usize] += p;
        }
        let out = Self::new(start, probs);
        if negate {
            out.negate()
        } else {
            out
        }
    }

    /// Truncating division by another distribution. A divisor with nonzero
    /// mass exactly at zero is a domain error; a support point at zero with
    /// exactly zero mass contributes nothing.
    pub fn div_pmf(self, rhs: Self) -> Result<Self> {
        if rhs.mass_at(0) != 0.0 {
            return Err(Error::DivisorMassAtZero);
        }
        let mut lower = Int::MAX;
        let mut upper = Int::MIN;
        for (d, _) in rhs.iter() {
            if d == 0 {
                continue;
            }
            for (v, _) in self.iter() {
                let q = v / d;
                lower = lower.min(q);
                upper = upper.max(q);
            }
        }
        let mut probs = vec![0.0; (upper - lower + 1) as usize];
        for (d, pd) in rhs.iter() {
            if d == 0 {
                continue;
            }
            for (v, pv) in self.iter() {
                probs[(v / d - lower) as usize] += pv * pd;
            }
        }
        Ok(Self::new(lower, probs))
    }

    /// Remaps each support value to its truncating remainder mod `m`,
    /// `|m| >= 2`.
    #[must_use]
    pub fn modulo(self, m: Int) -> Self {
        debug_assert!(m.abs() >= 2);
        let (lower, upper) = self
            .iter()
            .map(|(v, _)| v % m)
            .minmax()
            .into_option()
            .expect("non-empty support");
        let mut probs = vec![0.0; (upper - lower + 1) as usize];
        for (v, p) in self.iter() {
            probs[(v % m - lower) as usize] += p;
        }
        Self::new(lower, probs)
    }

    /// The distribution of the `position`-th smallest of `trials` samples
    /// (`position` may be negative to index from the top, -1 = maximum),
    /// expanded per support point over the compensated CDF.
    #[must_use]
    pub fn order_stat(self, trials: Int, position: Int) -> Self {
        let position = if position < 0 {
            trials + position + 1
        } else {
            position
        };
        debug_assert!(1 <= position && position <= trials);
        if trials == 1 && position == 1 {
            return self;
        }
        let mut probs = self.probs;
        let mut cumulative = Kahan::default();
        for slot in &mut probs {
            let p = *slot;
            cumulative.add(p);
            let f = cumulative.total();
            let t1 = 1.0 - f;
            let t3 = 1.0 - f + p;
            let t4 = f - p;
            let mut coeff = 1.0;
            let mut out = 0.0;
            for j in 0..=(trials - position) {
                out += coeff
                    * (t1.powi(j as i32) * f.powi((trials - j) as i32)
                        - t3.powi(j as i32) * t4.powi((trials - j) as i32));
                coeff *= (trials - j) as f64;
                coeff /= (j + 1) as f64;
            }
            *slot = out;
        }
        Self::new(self.offset, probs)
    }
}
