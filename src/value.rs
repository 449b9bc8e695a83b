use crate::drop::DropSolver;
use crate::pmf::Pmf;
use crate::util::Int;
use crate::Result;

/// A single operand or result in a dice expression.
///
/// `Dice` and `Keep` are unmaterialized literals; the evaluator converts them
/// to `Dist` the first time they are pushed on the evaluation stack. A
/// distribution whose support collapses to one point is always represented as
/// `Scalar` (the demotion rule), never as a length-1 `Dist`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Int),
    Dist(Pmf),
    Dice { count: Int, faces: Int },
    Keep { count: Int, faces: Int, keep: Int },
}

impl Value {
    /// Converts a dice or keep literal into a concrete distribution. Scalars
    /// and distributions pass through unchanged.
    pub(crate) fn materialize(self, solver: &mut DropSolver) -> Result<Self> {
        match self {
            Self::Dice { count, faces } => {
                if count == 0 || faces == 0 {
                    return Ok(Self::Scalar(0));
                }
                Ok(Self::from_pmf(Pmf::ndm(count, faces)))
            }
            Self::Keep { count, faces, keep } => {
                if count == 0 || faces == 0 || keep == 0 {
                    return Ok(Self::Scalar(0));
                }
                Ok(Self::from_pmf(solver.keep(faces, count, keep)?))
            }
            other => Ok(other),
        }
    }

    /// Wraps a PMF, demoting a one-point support to a certain scalar.
    pub(crate) fn from_pmf(pmf: Pmf) -> Self {
        if pmf.len() == 1 {
            Self::Scalar(pmf.offset())
        } else {
            Self::Dist(pmf)
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Dist(_) => "distribution",
            Self::Dice { .. } => "dice literal",
            Self::Keep { .. } => "keep literal",
        }
    }
}
