//! Bitwise operations: `& | ^ << >>`. Integer operands only.

use crate::error::EvalError;
use crate::script::eval::Engine;
use crate::script::math::{numeric, NumOp};
use crate::script::node::NodeId;
use crate::script::registry::operands;
use crate::store::VarStore;

fn binary<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
    op: NumOp,
    name: &'static str,
) -> Result<(), EvalError> {
    let (l, r) = operands(left, right)?;
    let v = numeric(op, name, &ev.program.node(l).value, &ev.program.node(r).value)?;
    ev.program.node_mut(result).value = v;
    Ok(())
}

pub(crate) fn band<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    binary(ev, result, left, right, NumOp::Band, "Band")
}

pub(crate) fn bor<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    binary(ev, result, left, right, NumOp::Bor, "Bor")
}

pub(crate) fn xor<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    binary(ev, result, left, right, NumOp::Xor, "Xor")
}

pub(crate) fn lshift<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    binary(ev, result, left, right, NumOp::LShift, "LShift")
}

pub(crate) fn rshift<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    binary(ev, result, left, right, NumOp::RShift, "RShift")
}
