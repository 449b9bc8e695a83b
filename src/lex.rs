use crate::expr::{Op, Token};
use crate::funcs::Func;
use crate::util::Int;
use crate::{Error, Result};

const MAX_NUMBER_LEN: usize = 10;

/// Splits an expression string into evaluator tokens: integer constants,
/// `NdF` dice literals, `NdFkK` keep literals (negative `K` keeps the worst
/// rolls instead of the best), operators including the two-character
/// comparison forms, parentheses, and function names. Unary minus is
/// rewritten as `-1 *`, and a parenthesized group followed by `(` or a dice
/// literal multiplies implicitly. Commas separate function arguments and
/// produce no token.
pub fn lex(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut out: Vec<Token> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == ',' {
            i += 1;
        } else if c == '(' {
            implicit_mul(&mut out);
            out.push(Token::LParen);
            i += 1;
        } else if c == ')' {
            out.push(Token::RParen);
            i += 1;
        } else if matches!(c, '>' | '<' | '=' | '!') && chars.get(i + 1) == Some(&'=') {
            out.push(Token::Op(match c {
                '>' => Op::Ge,
                '<' => Op::Le,
                '=' => Op::Eq,
                _ => Op::Ne,
            }));
            i += 2;
        } else if c == '-' && unary_position(out.last()) {
            // unary negative
            out.push(Token::Scalar(-1));
            out.push(Token::Op(Op::Mul));
            i += 1;
        } else if let Some(op) = operator(c) {
            out.push(Token::Op(op));
            i += 1;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            let word = word(&chars, &mut i);
            let token = word_token(&word)?;
            if matches!(token, Token::Dice { .. } | Token::Keep { .. }) {
                implicit_mul(&mut out);
            }
            out.push(token);
        } else {
            return Err(Error::InvalidInput(c.to_string()));
        }
    }
    Ok(out)
}

fn operator(c: char) -> Option<Op> {
    match c {
        '+' => Some(Op::Add),
        '-' => Some(Op::Sub),
        '*' => Some(Op::Mul),
        '/' => Some(Op::Div),
        '@' => Some(Op::At),
        '%' => Some(Op::Mod),
        '^' => Some(Op::Pow),
        '|' => Some(Op::Cond),
        '>' => Some(Op::Gt),
        '<' => Some(Op::Lt),
        '=' => Some(Op::Eq),
        _ => None,
    }
}

// A minus is unary at the start of the input, after an operator, or after an
// opening parenthesis.
fn unary_position(last: Option<&Token>) -> bool {
    matches!(last, None | Some(Token::Op(_) | Token::LParen))
}

fn implicit_mul(out: &mut Vec<Token>) {
    if matches!(out.last(), Some(Token::RParen)) {
        out.push(Token::Op(Op::Mul));
    }
}

// Consumes one word. A '-' continues the word only directly after the 'k' of
// a keep clause, so `4d6k-1` stays one token while `4d6-1` splits.
fn word(chars: &[char], i: &mut usize) -> String {
    let numeric = chars[*i].is_ascii_digit();
    let mut out = String::new();
    while let Some(&c) = chars.get(*i) {
        let keep_sign = numeric && c == '-' && out.ends_with('k');
        if c.is_ascii_alphanumeric() || c == '_' || keep_sign {
            out.push(c);
            *i += 1;
        } else {
            break;
        }
    }
    out
}

fn word_token(word: &str) -> Result<Token> {
    if !word.starts_with(|c: char| c.is_ascii_digit()) {
        return Func::lookup(word)
            .map(Token::Function)
            .ok_or_else(|| Error::UnknownFunction(word.to_string()));
    }
    let Some((count, rest)) = word.split_once('d') else {
        return Ok(Token::Scalar(number(word, word)?));
    };
    let count = number(count, word)?;
    let (faces, keep) = match rest.split_once('k') {
        None => (number(rest, word)?, None),
        Some((faces, keep)) => (number(faces, word)?, Some(number(keep, word)?)),
    };
    // a zero term anywhere makes the roll a certain 0
    if count == 0 || faces == 0 {
        return Ok(Token::Scalar(0));
    }
    match keep {
        None => Ok(Token::Dice { count, faces }),
        Some(0) => Ok(Token::Scalar(0)),
        Some(keep) => Ok(Token::Keep { count, faces, keep }),
    }
}

fn number(digits: &str, word: &str) -> Result<Int> {
    let unsigned = digits.strip_prefix('-').unwrap_or(digits);
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidInput(word.to_string()));
    }
    if unsigned.len() > MAX_NUMBER_LEN {
        return Err(Error::NumberTooBig);
    }
    digits
        .parse()
        .map_err(|_| Error::InvalidInput(word.to_string()))
}
