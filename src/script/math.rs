//! Arithmetic operations.
//!
//! Dispatch is on the left operand's type; the right operand is read
//! through the truncating slot accessors. Integer arithmetic wraps; a zero
//! divisor reports `DivisionByZero` for integer and float alike. `+` on
//! strings concatenates into the result node's own buffer.

use crate::error::EvalError;
use crate::script::eval::Engine;
use crate::script::node::NodeId;
use crate::script::registry::operands;
use crate::script::strings;
use crate::script::value::{Value, VarType};
use crate::store::VarStore;

/// The numeric kernel shared by the math, bitwise and compound-assign
/// handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumOp {
    Add,
    Sub,
    Mul,
    Div,
    Band,
    Bor,
    Xor,
    LShift,
    RShift,
}

/// Apply `op` to a typed pair, producing a value of the left operand's
/// type. `name` is the operation tag's diagnostic name.
pub(crate) fn numeric(
    op: NumOp,
    name: &'static str,
    left: &Value,
    right: &Value,
) -> Result<Value, EvalError> {
    match left.var_type() {
        VarType::Uint16 => {
            let a = left.as_u16();
            let b = right.as_u16();
            Ok(Value::Uint16(match op {
                NumOp::Add => a.wrapping_add(b),
                NumOp::Sub => a.wrapping_sub(b),
                NumOp::Mul => a.wrapping_mul(b),
                NumOp::Div => {
                    if b == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    a / b
                }
                NumOp::Band => a & b,
                NumOp::Bor => a | b,
                NumOp::Xor => a ^ b,
                NumOp::LShift => a.wrapping_shl(u32::from(b)),
                NumOp::RShift => a.wrapping_shr(u32::from(b)),
            }))
        }
        VarType::Uint32 => {
            let a = left.as_u32();
            let b = right.as_u32();
            Ok(Value::Uint32(match op {
                NumOp::Add => a.wrapping_add(b),
                NumOp::Sub => a.wrapping_sub(b),
                NumOp::Mul => a.wrapping_mul(b),
                NumOp::Div => {
                    if b == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    a / b
                }
                NumOp::Band => a & b,
                NumOp::Bor => a | b,
                NumOp::Xor => a ^ b,
                NumOp::LShift => a.wrapping_shl(b),
                NumOp::RShift => a.wrapping_shr(b),
            }))
        }
        VarType::Float => {
            let a = left.as_f32();
            let b = right.as_f32();
            Ok(Value::Float(match op {
                NumOp::Add => a + b,
                NumOp::Sub => a - b,
                NumOp::Mul => a * b,
                NumOp::Div => {
                    if b == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    a / b
                }
                _ => return Err(EvalError::Unsupported(name)),
            }))
        }
        VarType::Str => Err(EvalError::Unsupported(name)),
    }
}

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

pub(crate) fn add<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    let (l, r) = operands(left, right)?;
    if ev.program.node(l).value.var_type() == VarType::Str {
        return strings::add_string(ev, result, l, r);
    }
    binary(ev, result, left, right, NumOp::Add, "Add")
}

pub(crate) fn subtract<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    binary(ev, result, left, right, NumOp::Sub, "Sub")
}

pub(crate) fn multiply<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    binary(ev, result, left, right, NumOp::Mul, "Mul")
}

pub(crate) fn divide<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    binary(ev, result, left, right, NumOp::Div, "Div")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::node::Branch;
    use crate::script::registry::OpCode;
    use crate::store::MemoryStore;

    fn eval_binary(op: OpCode, l: &str, r: &str) -> Result<Value, EvalError> {
        let mut ev = Engine::new(MemoryStore::new());
        let a = ev.program.new_number(l);
        let b = ev.program.new_number(r);
        let node = ev
            .program
            .new_operation(op, Some(Branch::Expr(a)), Some(Branch::Expr(b)));
        ev.eval_node(node)?;
        Ok(ev.program.node(node).value.clone())
    }

    #[test]
    fn integer_arithmetic() {
        assert_eq!(eval_binary(OpCode::Add, "5", "3"), Ok(Value::Uint16(8)));
        assert_eq!(eval_binary(OpCode::Sub, "5", "3"), Ok(Value::Uint16(2)));
        assert_eq!(eval_binary(OpCode::Mul, "5", "3"), Ok(Value::Uint16(15)));
        assert_eq!(eval_binary(OpCode::Div, "7", "2"), Ok(Value::Uint16(3)));
    }

    #[test]
    fn integer_wrapping() {
        assert_eq!(
            eval_binary(OpCode::Sub, "0", "1"),
            Ok(Value::Uint16(0xFFFF))
        );
        assert_eq!(
            eval_binary(OpCode::Add, "65535U", "1"),
            Ok(Value::Uint16(0))
        );
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            eval_binary(OpCode::Div, "7", "0"),
            Err(EvalError::DivisionByZero)
        );
        assert_eq!(
            numeric(NumOp::Div, "Div", &Value::Float(1.0), &Value::Float(0.0)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn float_arithmetic() {
        let mut ev = Engine::new(MemoryStore::new());
        let a = ev.program.new_float("1.5");
        let b = ev.program.new_float("0.25");
        let node = ev.program.new_operation(
            OpCode::Add,
            Some(Branch::Expr(a)),
            Some(Branch::Expr(b)),
        );
        ev.eval_node(node).unwrap();
        assert_eq!(ev.program.node(node).value, Value::Float(1.75));
    }

    #[test]
    fn string_add_concatenates_into_fresh_buffer() {
        let mut ev = Engine::new(MemoryStore::new());
        let a = ev.program.new_string("foo");
        let b = ev.program.new_string("bar");
        let node = ev.program.new_operation(
            OpCode::Add,
            Some(Branch::Expr(a)),
            Some(Branch::Expr(b)),
        );
        ev.eval_node(node).unwrap();
        assert_eq!(ev.program.node(node).value, Value::from("foobar"));
        // Operands untouched.
        assert_eq!(ev.program.node(a).value, Value::from("foo"));
        assert_eq!(ev.program.node(b).value, Value::from("bar"));
    }

    #[test]
    fn string_subtraction_is_unsupported() {
        let mut ev = Engine::new(MemoryStore::new());
        let a = ev.program.new_string("foo");
        let b = ev.program.new_string("bar");
        let node = ev.program.new_operation(
            OpCode::Sub,
            Some(Branch::Expr(a)),
            Some(Branch::Expr(b)),
        );
        assert_eq!(ev.eval_node(node), Err(EvalError::Unsupported("Sub")));
    }
}
