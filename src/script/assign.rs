//! Assignment operations: `=`, the compound forms, and `++`/`--`.
//!
//! Every mutation of an external-store reference ends with exactly one
//! write-back through the store handle; plain locals mutate in place only.

use crate::error::EvalError;
use crate::script::eval::Engine;
use crate::script::math::{numeric, NumOp};
use crate::script::node::NodeId;
use crate::script::registry::{operands, OpCode};
use crate::script::strings;
use crate::script::value::{Value, VarType};
use crate::store::VarStore;

/// Push the node's value out to the external store when the node is a
/// store-backed reference.
pub(crate) fn write_back<S: VarStore>(
    ev: &mut Engine<S>,
    id: NodeId,
) -> Result<(), EvalError> {
    let node = ev.program.node(id);
    if node.op == OpCode::Sysvar {
        if let Some(handle) = node.handle {
            let value = node.value.clone();
            ev.store.set(handle, &value)?;
        }
    }
    Ok(())
}

pub(crate) fn assign<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    let (l, r) = operands(left, right)?;
    match ev.program.node(l).value.var_type() {
        VarType::Uint16 => {
            let v = Value::Uint16(ev.program.node(r).value.as_u16());
            ev.program.node_mut(l).value = v.clone();
            ev.program.node_mut(result).value = v;
        }
        VarType::Uint32 => {
            let v = Value::Uint32(ev.program.node(r).value.as_u32());
            ev.program.node_mut(l).value = v.clone();
            ev.program.node_mut(result).value = v;
        }
        VarType::Float => {
            let v = Value::Float(ev.program.node(r).value.as_f32());
            ev.program.node_mut(l).value = v.clone();
            ev.program.node_mut(result).value = v;
        }
        VarType::Str => strings::assign_string(ev, result, l, r)?,
    }
    ev.program.mark_assigned(l);
    write_back(ev, l)
}

fn compound<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
    op: NumOp,
    name: &'static str,
) -> Result<(), EvalError> {
    let (l, r) = operands(left, right)?;
    if ev.program.node(l).value.var_type() == VarType::Str {
        if op == NumOp::Add {
            strings::concat_string(ev, result, l, r)?;
        } else {
            return Err(EvalError::Unsupported(name));
        }
    } else {
        let v = numeric(op, name, &ev.program.node(l).value, &ev.program.node(r).value)?;
        ev.program.node_mut(l).value = v.clone();
        ev.program.node_mut(result).value = v;
    }
    ev.program.mark_assigned(l);
    write_back(ev, l)
}

pub(crate) fn plus_equals<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compound(ev, result, left, right, NumOp::Add, "PlusEquals")
}

pub(crate) fn minus_equals<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compound(ev, result, left, right, NumOp::Sub, "MinusEquals")
}

pub(crate) fn times_equals<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compound(ev, result, left, right, NumOp::Mul, "TimesEquals")
}

pub(crate) fn div_equals<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compound(ev, result, left, right, NumOp::Div, "DivEquals")
}

pub(crate) fn and_equals<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compound(ev, result, left, right, NumOp::Band, "AndEquals")
}

pub(crate) fn or_equals<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compound(ev, result, left, right, NumOp::Bor, "OrEquals")
}

pub(crate) fn xor_equals<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compound(ev, result, left, right, NumOp::Xor, "XorEquals")
}

/// `++`: post form when the operand is the left child (result gets the old
/// value), pre form when it is the right child (result gets the new value).
pub(crate) fn increment<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    step(ev, result, left, right, 1, "Inc")
}

/// `--`, same pre/post convention as `++`.
pub(crate) fn decrement<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    step(ev, result, left, right, -1, "Dec")
}

fn step<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
    delta: i32,
    name: &'static str,
) -> Result<(), EvalError> {
    let (target, post) = match (left, right) {
        (Some(l), _) => (l, true),
        (None, Some(r)) => (r, false),
        (None, None) => return Err(EvalError::InvalidArgument),
    };
    let old = ev.program.node(target).value.clone();
    let new = match old {
        Value::Uint16(v) => Value::Uint16(v.wrapping_add_signed(delta as i16)),
        Value::Uint32(v) => Value::Uint32(v.wrapping_add_signed(delta)),
        _ => return Err(EvalError::Unsupported(name)),
    };
    ev.program.node_mut(target).value = new.clone();
    ev.program.node_mut(result).value = if post { old } else { new };
    write_back(ev, target)
}
