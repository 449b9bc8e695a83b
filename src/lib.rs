mod drop;
mod expr;
mod funcs;
mod lex;
mod operators;
mod pmf;
mod spectrum;
mod util;
mod value;

pub use drop::DropSolver;
pub use expr::{evaluate, Evaluator, Op, Token};
pub use funcs::Func;
pub use lex::lex;
pub use pmf::Pmf;
pub use util::Int;
pub use value::Value;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("mismatched parentheses")]
    MismatchedParens,
    #[error("no function named \"{0}\"")]
    UnknownFunction(String),
    #[error("number too big")]
    NumberTooBig,
    #[error("invalid input near \"{0}\"")]
    InvalidInput(String),
    #[error("malformed expression")]
    Malformed,
    #[error("operator {op} not implemented for {lhs} and {rhs}")]
    UnsupportedOperands {
        op: Op,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("operator {0} is not implemented")]
    UnsupportedOperator(Op),
    #[error("cannot divide by zero")]
    DivisionByZero,
    #[error("cannot take modulo by zero")]
    ModuloByZero,
    #[error("divisor has nonzero probability at zero")]
    DivisorMassAtZero,
    #[error("invalid argument for {0}")]
    FunctionArgument(&'static str),
    #[error("illegal values for order_stat(.., trials={trials}, position={position})")]
    OrderStatRange { trials: Int, position: Int },
    #[error("drop cache would grow to {entries} entries, past the memory ceiling")]
    DropMemoryLimit { entries: usize },
}

const DROP_CACHE_MAX_ENTRIES: usize = 4 * 1024 * 1024 * 1024 / std::mem::size_of::<f64>();
