//! Boolean operations: `&& || !`.
//!
//! Operands are reduced to truthiness first: nonzero for numerics,
//! non-empty for strings. The result is always a 16-bit 1 or 0.

use crate::error::EvalError;
use crate::script::eval::Engine;
use crate::script::node::NodeId;
use crate::script::registry::{operand, operands};
use crate::script::value::Value;
use crate::store::VarStore;

pub(crate) fn and<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    let (l, r) = operands(left, right)?;
    let v = ev.program.node(l).value.is_truthy() && ev.program.node(r).value.is_truthy();
    ev.program.node_mut(result).value = Value::from(v);
    Ok(())
}

pub(crate) fn or<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    let (l, r) = operands(left, right)?;
    let v = ev.program.node(l).value.is_truthy() || ev.program.node(r).value.is_truthy();
    ev.program.node_mut(result).value = Value::from(v);
    Ok(())
}

/// `!`: unary, operand in the left child.
pub(crate) fn not<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    _right: Option<NodeId>,
) -> Result<(), EvalError> {
    let l = operand(left)?;
    let v = !ev.program.node(l).value.is_truthy();
    ev.program.node_mut(result).value = Value::from(v);
    Ok(())
}
