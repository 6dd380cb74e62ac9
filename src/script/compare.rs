//! Comparison operations: `== != > < >= <=`.
//!
//! Dispatch is on the left operand's type. Strings compare by byte
//! ordering; an absent buffer compares as the empty string, so two empty
//! strings are equal and an empty side orders below a non-empty one. The
//! result is always a 16-bit 1 or 0.

use std::cmp::Ordering;

use crate::error::EvalError;
use crate::script::eval::Engine;
use crate::script::node::NodeId;
use crate::script::registry::operands;
use crate::script::value::{Value, VarType};
use crate::store::VarStore;

fn ordering(left: &Value, right: &Value) -> Ordering {
    match left.var_type() {
        VarType::Uint16 => left.as_u16().cmp(&right.as_u16()),
        VarType::Uint32 => left.as_u32().cmp(&right.as_u32()),
        VarType::Float => left
            .as_f32()
            .partial_cmp(&right.as_f32())
            .unwrap_or(Ordering::Equal),
        VarType::Str => left.str_bytes().cmp(&right.str_bytes()),
    }
}

fn compare<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
    accept: fn(Ordering) -> bool,
) -> Result<(), EvalError> {
    let (l, r) = operands(left, right)?;
    let ord = ordering(&ev.program.node(l).value, &ev.program.node(r).value);
    ev.program.node_mut(result).value = Value::from(accept(ord));
    Ok(())
}

pub(crate) fn equals<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compare(ev, result, left, right, |o| o == Ordering::Equal)
}

pub(crate) fn not_equals<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compare(ev, result, left, right, |o| o != Ordering::Equal)
}

pub(crate) fn greater_than<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compare(ev, result, left, right, |o| o == Ordering::Greater)
}

pub(crate) fn less_than<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compare(ev, result, left, right, |o| o == Ordering::Less)
}

pub(crate) fn greater_or_equal<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compare(ev, result, left, right, |o| o != Ordering::Less)
}

pub(crate) fn less_or_equal<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    compare(ev, result, left, right, |o| o != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::node::Branch;
    use crate::script::registry::OpCode;
    use crate::store::MemoryStore;

    fn eval_cmp(op: OpCode, a: Value, b: Value) -> Value {
        let mut ev = Engine::new(MemoryStore::new());
        let l = ev.program.new_number("0");
        let r = ev.program.new_number("0");
        ev.program.node_mut(l).value = a;
        ev.program.node_mut(r).value = b;
        let node = ev
            .program
            .new_operation(op, Some(Branch::Expr(l)), Some(Branch::Expr(r)));
        ev.eval_node(node).unwrap();
        ev.program.node(node).value.clone()
    }

    #[test]
    fn integer_comparisons() {
        assert_eq!(
            eval_cmp(OpCode::Equals, Value::Uint16(5), Value::Uint16(5)),
            Value::Uint16(1)
        );
        assert_eq!(
            eval_cmp(OpCode::NotEquals, Value::Uint16(5), Value::Uint16(5)),
            Value::Uint16(0)
        );
        assert_eq!(
            eval_cmp(OpCode::Gt, Value::Uint16(6), Value::Uint16(5)),
            Value::Uint16(1)
        );
        assert_eq!(
            eval_cmp(OpCode::Lte, Value::Uint16(5), Value::Uint16(5)),
            Value::Uint16(1)
        );
        assert_eq!(
            eval_cmp(OpCode::Gte, Value::Uint32(4), Value::Uint32(5)),
            Value::Uint16(0)
        );
    }

    #[test]
    fn float_comparisons() {
        assert_eq!(
            eval_cmp(OpCode::Lt, Value::Float(1.5), Value::Float(2.0)),
            Value::Uint16(1)
        );
        assert_eq!(
            eval_cmp(OpCode::Equals, Value::Float(1.5), Value::Float(1.5)),
            Value::Uint16(1)
        );
    }

    #[test]
    fn string_ordering() {
        assert_eq!(
            eval_cmp(OpCode::Lt, Value::from("abc"), Value::from("abd")),
            Value::Uint16(1)
        );
        assert_eq!(
            eval_cmp(OpCode::Gt, Value::from("b"), Value::from("a")),
            Value::Uint16(1)
        );
        assert_eq!(
            eval_cmp(OpCode::Equals, Value::from("same"), Value::from("same")),
            Value::Uint16(1)
        );
    }

    #[test]
    fn empty_strings_compare_equal() {
        assert_eq!(
            eval_cmp(OpCode::Equals, Value::from(""), Value::from("")),
            Value::Uint16(1)
        );
        assert_eq!(
            eval_cmp(OpCode::Equals, Value::Str(None), Value::from("")),
            Value::Uint16(1)
        );
        // Exactly one empty: the empty side is lesser.
        assert_eq!(
            eval_cmp(OpCode::Lt, Value::Str(None), Value::from("a")),
            Value::Uint16(1)
        );
        assert_eq!(
            eval_cmp(OpCode::Gt, Value::from("a"), Value::Str(None)),
            Value::Uint16(1)
        );
    }
}
