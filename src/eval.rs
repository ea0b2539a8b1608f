use crate::error::{CalcError, Result};
use crate::lexer::Op;

pub fn evaluate_binop(op: Op, lhs: f64, rhs: f64) -> Result<f64> {
    let out = match op {
        Op::Add => lhs + rhs,
        Op::Sub => lhs - rhs,
        Op::Mul => lhs * rhs,
        Op::Div | Op::Mod if rhs == 0.0 => raise!(CalcError::Arithmetic, "divide by zero"),
        Op::Div => lhs / rhs,
        // `%` on f64 is the C fmod: the sign follows the dividend
        Op::Mod => lhs % rhs,
    };

    Ok(out)
}

pub fn evaluate_monop(op: Op, arg: f64) -> Result<f64> {
    let out = match op {
        Op::Add => arg,
        Op::Sub => -arg,
        _ => raise!(CalcError::Syntax, "invalid unary operator '{}'", op.name()),
    };

    Ok(out)
}

/// Format a value for people: plain decimals for ordinary magnitudes, scientific notation for
/// very large or very small ones. Both forms are the shortest that parse back to `x`.
pub fn format_value(x: f64) -> String {
    let magnitude = x.abs();

    if magnitude == 0.0 || !x.is_finite() || (1e-6..1e15).contains(&magnitude) {
        x.to_string()
    } else {
        format!("{:e}", x)
    }
}
