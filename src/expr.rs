//! Closed-form trip-count expression trees, as exported by the host's
//! scalar-evolution style analysis. A closed tagged enum replaces the
//! host's runtime type tests over expression nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A free IR value, carried as the host's typed textual identity
    /// (e.g. `"i32 %limit"` or `"%add"`).
    Unknown { value: String },
    Const { value: i64 },
    Op { op: ExprOp, operands: Vec<Expr> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprOp {
    Add,
    Mul,
    UDiv,
    SMax,
    UMax,
    SMin,
    UMin,
    ZExt,
    SExt,
    Trunc,
}

impl Expr {
    /// Expression-size measure: 1 for a leaf, 1 + sum over operands
    /// otherwise. An operand is *atomic* iff its size is 1.
    pub fn size(&self) -> usize {
        match self {
            Expr::Unknown { .. } | Expr::Const { .. } => 1,
            Expr::Op { operands, .. } => {
                1 + operands.iter().map(Expr::size).sum::<usize>()
            }
        }
    }

    pub fn is_atomic(&self) -> bool {
        self.size() == 1
    }

    /// Child list; empty for leaves.
    pub fn operands(&self) -> &[Expr] {
        match self {
            Expr::Unknown { .. } | Expr::Const { .. } => &[],
            Expr::Op { operands, .. } => operands,
        }
    }

    /// Sigil-prefixed display form of an `Unknown`, with the host's type
    /// prefix dropped: `"i32 %limit"` → `"%limit"`.
    fn unknown_display(value: &str) -> &str {
        match value.find('%') {
            Some(pos) => &value[pos..],
            None => value.trim(),
        }
    }
}

impl ExprOp {
    /// Infix spelling for n-ary operations, `None` for unary casts.
    fn infix(self) -> Option<&'static str> {
        match self {
            ExprOp::Add => Some(" + "),
            ExprOp::Mul => Some(" * "),
            ExprOp::UDiv => Some(" /u "),
            ExprOp::SMax => Some(" smax "),
            ExprOp::UMax => Some(" umax "),
            ExprOp::SMin => Some(" smin "),
            ExprOp::UMin => Some(" umin "),
            ExprOp::ZExt | ExprOp::SExt | ExprOp::Trunc => None,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            ExprOp::ZExt => "zext",
            ExprOp::SExt => "sext",
            ExprOp::Trunc => "trunc",
            _ => "",
        }
    }
}

impl fmt::Display for Expr {
    /// Parenthesized rendering in the host's own spelling, e.g.
    /// `(-1 + %limit)`, `(%a smax %b)`, `(zext %n)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const { value } => write!(f, "{}", value),
            Expr::Unknown { value } => {
                write!(f, "{}", Expr::unknown_display(value))
            }
            Expr::Op { op, operands } => match op.infix() {
                Some(sep) => {
                    write!(f, "(")?;
                    for (i, operand) in operands.iter().enumerate() {
                        if i > 0 {
                            write!(f, "{}", sep)?;
                        }
                        write!(f, "{}", operand)?;
                    }
                    write!(f, ")")
                }
                None => match operands.first() {
                    Some(inner) => write!(f, "({} {})", op.prefix(), inner),
                    None => write!(f, "({})", op.prefix()),
                },
            },
        }
    }
}
