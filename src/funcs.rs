use crate::util::Int;
use crate::value::Value;
use crate::{Error, Result};

/// Built-in functions callable with `name(args...)` syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Func {
    Advantage,
    Disadvantage,
    OrderStat,
}

impl Func {
    pub(crate) fn lookup(name: &str) -> Option<Self> {
        match name {
            "adv" | "advantage" => Some(Self::Advantage),
            "dis" | "disadvantage" => Some(Self::Disadvantage),
            "order" | "order_stat" => Some(Self::OrderStat),
            _ => None,
        }
    }

    /// Number of operands this function pops off the evaluation stack.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Advantage | Self::Disadvantage => 1,
            Self::OrderStat => 3,
        }
    }

    /// `args` holds the operands in call order. Scalars pass through every
    /// function unchanged, since a certain value stays certain under
    /// resampling.
    pub(crate) fn apply(self, mut args: Vec<Value>) -> Result<Value> {
        debug_assert_eq!(args.len(), self.arity());
        match self {
            Self::Advantage => sample_stat(args.remove(0), 2, 2, "adv"),
            Self::Disadvantage => sample_stat(args.remove(0), 2, 1, "dis"),
            Self::OrderStat => order_stat(args.remove(0), &args[0], &args[1]),
        }
    }
}

fn sample_stat(x: Value, trials: Int, position: Int, name: &'static str) -> Result<Value> {
    match x {
        Value::Scalar(_) => Ok(x),
        Value::Dist(d) => Ok(Value::Dist(d.order_stat(trials, position))),
        _ => Err(Error::FunctionArgument(name)),
    }
}

/// `order_stat(x, position, trials)`. It must hold that trials >= position,
/// so arguments given in the wrong order are swapped rather than rejected.
/// `position` counts from 1 (minimum) to `trials` (maximum), or backwards
/// from -1 (maximum) like a Python index.
fn order_stat(x: Value, position: &Value, trials: &Value) -> Result<Value> {
    if let Value::Scalar(_) = x {
        return Ok(x);
    }
    let (&Value::Scalar(mut position), &Value::Scalar(mut trials)) = (position, trials) else {
        return Err(Error::FunctionArgument("order_stat"));
    };
    if trials < position {
        std::mem::swap(&mut trials, &mut position);
    }
    if position < 0 {
        position += trials + 1;
    }
    if position < 1 || position > trials {
        return Err(Error::OrderStatRange { trials, position });
    }
    match x {
        Value::Dist(d) => Ok(Value::Dist(d.order_stat(trials, position))),
        _ => Err(Error::FunctionArgument("order_stat")),
    }
}
