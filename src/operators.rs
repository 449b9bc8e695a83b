use crate::expr::Op;
use crate::pmf::Pmf;
use crate::util::{Int, Kahan};
use crate::value::Value;
use crate::{Error, Result};

/// Applies a binary operator, dispatching on the `{scalar, distribution}`
/// pair of operand tags. Literals are materialized by the evaluator before
/// they get here, so any other combination is an internal invariant
/// violation surfaced as `UnsupportedOperands`.
pub(crate) fn apply(op: Op, lhs: Value, rhs: Value) -> Result<Value> {
    match op {
        Op::Add => add(lhs, rhs),
        Op::Sub => sub(lhs, rhs),
        Op::Mul => mul(lhs, rhs),
        Op::Div => div(lhs, rhs),
        Op::At => of(lhs, rhs),
        Op::Mod => modulo(lhs, rhs),
        Op::Eq | Op::Ne | Op::Gt | Op::Lt | Op::Ge | Op::Le => compare(op, lhs, rhs),
        // Parsed but reserved; no dispatch exists.
        Op::Pow | Op::Cond => Err(Error::UnsupportedOperator(op)),
    }
}

fn unsupported(op: Op, lhs: &Value, rhs: &Value) -> Error {
    Error::UnsupportedOperands {
        op,
        lhs: lhs.kind(),
        rhs: rhs.kind(),
    }
}

fn add(lhs: Value, rhs: Value) -> Result<Value> {
    use Value::{Dist, Scalar};
    match (lhs, rhs) {
        (Scalar(x), Scalar(y)) => Ok(Scalar(x + y)),
        (Dist(d), Scalar(s)) | (Scalar(s), Dist(d)) => Ok(Dist(d.shift(s))),
        (Dist(x), Dist(y)) => Ok(Dist(x.convolve(y))),
        (lhs, rhs) => Err(unsupported(Op::Add, &lhs, &rhs)),
    }
}

fn sub(lhs: Value, rhs: Value) -> Result<Value> {
    use Value::{Dist, Scalar};
    match (lhs, rhs) {
        (Scalar(x), Scalar(y)) => Ok(Scalar(x - y)),
        (Dist(d), Scalar(s)) => Ok(Dist(d.shift(-s))),
        (Scalar(s), Dist(d)) => Ok(Dist(d.negate().shift(s))),
        (Dist(x), Dist(y)) => Ok(Dist(x.convolve(y.negate()))),
        (lhs, rhs) => Err(unsupported(Op::Sub, &lhs, &rhs)),
    }
}

fn mul(lhs: Value, rhs: Value) -> Result<Value> {
    use Value::{Dist, Scalar};
    match (lhs, rhs) {
        (Scalar(x), Scalar(y)) => Ok(Scalar(x * y)),
        (Dist(d), Scalar(s)) | (Scalar(s), Dist(d)) => Ok(scale(d, s)),
        (Dist(x), Dist(y)) => Ok(Dist(x.product(y))),
        (lhs, rhs) => Err(unsupported(Op::Mul, &lhs, &rhs)),
    }
}

// Scalar times distribution; zero collapses to a certain 0.
fn scale(d: Pmf, s: Int) -> Value {
    if s == 0 {
        Value::Scalar(0)
    } else {
        Value::Dist(d.grow(s))
    }
}

fn div(lhs: Value, rhs: Value) -> Result<Value> {
    use Value::{Dist, Scalar};
    match (lhs, rhs) {
        (Scalar(_), Scalar(0)) | (Dist(_), Scalar(0)) => Err(Error::DivisionByZero),
        (Scalar(x), Scalar(y)) => Ok(Scalar(x / y)),
        (Dist(d), Scalar(s)) => Ok(Value::from_pmf(d.div_scalar(s))),
        (Scalar(x), Dist(d)) => Ok(Value::from_pmf(Pmf::point(x).div_pmf(d)?)),
        (Dist(x), Dist(y)) => Ok(Value::from_pmf(x.div_pmf(y)?)),
        (lhs, rhs) => Err(unsupported(Op::Div, &lhs, &rhs)),
    }
}

// The @ operator: evaluate the left side, then add together that many copies
// of the right side.
fn of(lhs: Value, rhs: Value) -> Result<Value> {
    use Value::{Dist, Scalar};
    match (lhs, rhs) {
        (Scalar(x), Scalar(y)) => Ok(Scalar(x * y)),
        (Scalar(0), Dist(_)) => Ok(Scalar(0)),
        (Scalar(s), Dist(d)) => Ok(Dist(d.self_convolve(s))),
        (Dist(d), Scalar(s)) => Ok(scale(d, s)),
        (Dist(x), Dist(y)) => Ok(Value::from_pmf(x.roll_sum(y))),
        (lhs, rhs) => Err(unsupported(Op::At, &lhs, &rhs)),
    }
}

fn modulo(lhs: Value, rhs: Value) -> Result<Value> {
    use Value::{Dist, Scalar};
    match (lhs, rhs) {
        (Scalar(_), Scalar(0)) | (Dist(_), Scalar(0)) => Err(Error::ModuloByZero),
        (Scalar(x), Scalar(m)) => Ok(Scalar(x % m)),
        (Dist(_), Scalar(1)) | (Dist(_), Scalar(-1)) => Ok(Scalar(0)),
        (Dist(d), Scalar(m)) => Ok(Value::from_pmf(d.modulo(m))),
        (lhs, rhs) => Err(unsupported(Op::Mod, &lhs, &rhs)),
    }
}

fn compare(op: Op, lhs: Value, rhs: Value) -> Result<Value> {
    use Value::{Dist, Scalar};
    match (lhs, rhs) {
        (Scalar(x), Scalar(y)) => {
            let truth = match op {
                Op::Eq => x == y,
                Op::Ne => x != y,
                Op::Gt => x > y,
                Op::Lt => x < y,
                Op::Ge => x >= y,
                Op::Le => x <= y,
                _ => unreachable!("non-comparison operator"),
            };
            Ok(Scalar(Int::from(truth)))
        }
        (Dist(d), Scalar(s)) => Ok(match op {
            Op::Eq => eq_dist_scalar(d, s),
            Op::Ne => negate_truth(eq_dist_scalar(d, s)),
            Op::Gt => gt_dist_scalar(d, s),
            Op::Lt => lt_dist_scalar(d, s),
            Op::Ge => ge_dist_scalar(d, s),
            Op::Le => le_dist_scalar(d, s),
            _ => unreachable!("non-comparison operator"),
        }),
        (Scalar(s), Dist(d)) => Ok(match op {
            Op::Eq => eq_dist_scalar(d, s),
            Op::Ne => negate_truth(eq_dist_scalar(d, s)),
            Op::Gt => lt_dist_scalar(d, s),
            Op::Lt => gt_dist_scalar(d, s),
            Op::Ge => le_dist_scalar(d, s),
            Op::Le => ge_dist_scalar(d, s),
            _ => unreachable!("non-comparison operator"),
        }),
        (Dist(x), Dist(y)) => Ok(match op {
            Op::Eq => eq_dist_dist(x, y),
            Op::Ne => negate_truth(eq_dist_dist(x, y)),
            Op::Gt => gt_dist_dist(x, y),
            Op::Lt => gt_dist_dist(y, x),
            Op::Ge => le_dist_dist(y, x),
            Op::Le => le_dist_dist(x, y),
            _ => unreachable!("non-comparison operator"),
        }),
        (lhs, rhs) => Err(unsupported(op, &lhs, &rhs)),
    }
}

// Two-point Bernoulli distribution [P(false), P(true)] at offset 0.
fn bernoulli(p: f64) -> Value {
    Value::Dist(Pmf::new(0, vec![1.0 - p, p]))
}

fn negate_truth(truth: Value) -> Value {
    match truth {
        Value::Scalar(b) => Value::Scalar(1 - b),
        Value::Dist(d) => {
            let p = d.probs()[0];
            Value::Dist(Pmf::new(0, vec![d.probs()[1], p]))
        }
        other => other,
    }
}

// P(d = s)
fn eq_dist_scalar(d: Pmf, s: Int) -> Value {
    if s < d.offset() || s > d.max_value() {
        return Value::Scalar(0);
    }
    bernoulli(d.mass_at(s))
}

// P(d > s)
fn gt_dist_scalar(d: Pmf, s: Int) -> Value {
    if s >= d.max_value() {
        return Value::Scalar(0);
    }
    if s < d.offset() {
        return Value::Scalar(1);
    }
    let idx = (s - d.offset()) as usize;
    let cdf = d.cumulative();
    bernoulli(1.0 - cdf[idx])
}

// P(d < s)
fn lt_dist_scalar(d: Pmf, s: Int) -> Value {
    if s > d.max_value() {
        return Value::Scalar(1);
    }
    if s <= d.offset() {
        return Value::Scalar(0);
    }
    let idx = (s - d.offset()) as usize;
    let cdf = d.cumulative();
    bernoulli(cdf[idx - 1])
}

// P(d >= s)
fn ge_dist_scalar(d: Pmf, s: Int) -> Value {
    if s > d.max_value() {
        return Value::Scalar(0);
    }
    if s <= d.offset() {
        return Value::Scalar(1);
    }
    let idx = (s - d.offset()) as usize;
    let cdf = d.cumulative();
    bernoulli(1.0 - cdf[idx - 1])
}

// P(d <= s)
fn le_dist_scalar(d: Pmf, s: Int) -> Value {
    if s >= d.max_value() {
        return Value::Scalar(1);
    }
    if s < d.offset() {
        return Value::Scalar(0);
    }
    let idx = (s - d.offset()) as usize;
    let cdf = d.cumulative();
    bernoulli(cdf[idx])
}

// P(x = y) over the overlap of the two supports, with disjoint supports
// short-circuiting to a certain scalar.
fn eq_dist_dist(x: Pmf, y: Pmf) -> Value {
    let (lo, hi) = if x.offset() <= y.offset() { (x, y) } else { (y, x) };
    if hi.offset() > lo.max_value() {
        return Value::Scalar(0);
    }
    if lo.len() == 1 && hi.len() == 1 {
        // two point masses at the same value
        return Value::Scalar(1);
    }
    let mut sum = Kahan::default();
    for (n, p) in hi.iter() {
        let j = n - lo.offset();
        if j >= lo.len() as Int {
            break;
        }
        sum.add(lo.probs()[j as usize] * p);
    }
    bernoulli(sum.total())
}

// P(x > y), by the law of total probability over y's support against x's
// compensated CDF.
fn prob_gt(x: &Pmf, y: &Pmf) -> f64 {
    let cdf = x.cumulative();
    let mut sum = Kahan::default();
    for (n, p) in y.iter() {
        if n > x.max_value() {
            break;
        }
        let f = if n < x.offset() {
            0.0
        } else {
            cdf[(n - x.offset()) as usize]
        };
        sum.add((1.0 - f) * p);
    }
    sum.total()
}

fn gt_dist_dist(x: Pmf, y: Pmf) -> Value {
    if x.offset() > y.max_value() {
        return Value::Scalar(1);
    }
    if x.max_value() <= y.offset() {
        return Value::Scalar(0);
    }
    bernoulli(prob_gt(&x, &y))
}

fn le_dist_dist(x: Pmf, y: Pmf) -> Value {
    if x.offset() > y.max_value() {
        return Value::Scalar(0);
    }
    if x.max_value() <= y.offset() {
        return Value::Scalar(1);
    }
    bernoulli(1.0 - prob_gt(&x, &y))
}
