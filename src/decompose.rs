//! Decomposition of a closed-form trip count into its atomic terms,
//! resolving each free term to a debug-correlated source variable.

use crate::debug_info::{normalize_symbol, CorrelationTable};
use crate::expr::Expr;
use crate::profile::DebugVariableInfo;

/// Walk the operand list of `expr` in pre-order and collect correlation
/// info for every atomic free term the table knows about.
///
/// * Constants and unresolvable terms (compiler temporaries without a
///   debug binding) are silently skipped.
/// * Duplicates are preserved: a variable referenced by several
///   sub-terms appears once per reference.
/// * A bare leaf expression has no operands and yields an empty list.
pub fn decompose(expr: &Expr, table: &CorrelationTable) -> Vec<DebugVariableInfo> {
    let mut out = Vec::new();
    walk(expr, table, &mut out);
    out
}

fn walk(expr: &Expr, table: &CorrelationTable, out: &mut Vec<DebugVariableInfo>) {
    for operand in expr.operands() {
        if operand.is_atomic() {
            if let Expr::Unknown { value } = operand {
                if let Some(info) = table.get(normalize_symbol(value)) {
                    out.push(info.clone());
                }
            }
        } else {
            walk(operand, table, out);
        }
    }
}
