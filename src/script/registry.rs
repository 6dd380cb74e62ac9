//! Operation registry: the closed set of operation tags and the dispatch
//! from a tag to its engine handler.
//!
//! Dispatch is a single `match` over [`OpCode`]. Literal and reference tags
//! that need no work at evaluation time succeed as no-ops; tags with no
//! handler fall through to `Unsupported`.

use tracing::warn;

use crate::error::EvalError;
use crate::script::eval::{self, Engine};
use crate::script::node::NodeId;
use crate::script::{assign, bitwise, boolean, compare, math, timers, typecast};
use crate::store::VarStore;

/// Every operation tag a node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Illegal,
    Assign,
    Mul,
    Div,
    Add,
    Sub,
    Band,
    Bor,
    Xor,
    Inc,
    Dec,
    LShift,
    RShift,
    And,
    Or,
    Not,
    Equals,
    NotEquals,
    Gt,
    Lt,
    Gte,
    Lte,
    AndEquals,
    OrEquals,
    XorEquals,
    DivEquals,
    TimesEquals,
    PlusEquals,
    MinusEquals,
    Sysvar,
    ToFloat,
    ToInt,
    ToShort,
    ToString,
    Num,
    FloatNum,
    LocalVar,
    StringLit,
    If,
    Else,
    CreateTimer,
    CreateTick,
    DeleteTimer,
    ActiveTimer,
    Timer,
}

impl OpCode {
    /// Diagnostic name, used in log messages.
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Illegal => "Illegal",
            OpCode::Assign => "Assign",
            OpCode::Mul => "Mul",
            OpCode::Div => "Div",
            OpCode::Add => "Add",
            OpCode::Sub => "Sub",
            OpCode::Band => "Band",
            OpCode::Bor => "Bor",
            OpCode::Xor => "Xor",
            OpCode::Inc => "Inc",
            OpCode::Dec => "Dec",
            OpCode::LShift => "LShift",
            OpCode::RShift => "RShift",
            OpCode::And => "And",
            OpCode::Or => "Or",
            OpCode::Not => "Not",
            OpCode::Equals => "Equals",
            OpCode::NotEquals => "NotEquals",
            OpCode::Gt => "Gt",
            OpCode::Lt => "Lt",
            OpCode::Gte => "Gte",
            OpCode::Lte => "Lte",
            OpCode::AndEquals => "AndEquals",
            OpCode::OrEquals => "OrEquals",
            OpCode::XorEquals => "XorEquals",
            OpCode::DivEquals => "DivEquals",
            OpCode::TimesEquals => "TimesEquals",
            OpCode::PlusEquals => "PlusEquals",
            OpCode::MinusEquals => "MinusEquals",
            OpCode::Sysvar => "Sysvar",
            OpCode::ToFloat => "ToFloat",
            OpCode::ToInt => "ToInt",
            OpCode::ToShort => "ToShort",
            OpCode::ToString => "ToString",
            OpCode::Num => "Num",
            OpCode::FloatNum => "FloatNum",
            OpCode::LocalVar => "LocalVar",
            OpCode::StringLit => "StringLit",
            OpCode::If => "If",
            OpCode::Else => "Else",
            OpCode::CreateTimer => "CreateTimer",
            OpCode::CreateTick => "CreateTick",
            OpCode::DeleteTimer => "DeleteTimer",
            OpCode::ActiveTimer => "ActiveTimer",
            OpCode::Timer => "Timer",
        }
    }
}

/// A required operand that was absent.
pub(crate) fn operand(n: Option<NodeId>) -> Result<NodeId, EvalError> {
    n.ok_or(EvalError::InvalidArgument)
}

/// Both operands, or `InvalidArgument`.
pub(crate) fn operands(
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(NodeId, NodeId), EvalError> {
    match (left, right) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(EvalError::InvalidArgument),
    }
}

/// Run the handler for `op` against the result node and its operands.
pub(crate) fn apply<S: VarStore>(
    ev: &mut Engine<S>,
    op: OpCode,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    match op {
        OpCode::Assign => assign::assign(ev, result, left, right),
        OpCode::PlusEquals => assign::plus_equals(ev, result, left, right),
        OpCode::MinusEquals => assign::minus_equals(ev, result, left, right),
        OpCode::TimesEquals => assign::times_equals(ev, result, left, right),
        OpCode::DivEquals => assign::div_equals(ev, result, left, right),
        OpCode::AndEquals => assign::and_equals(ev, result, left, right),
        OpCode::OrEquals => assign::or_equals(ev, result, left, right),
        OpCode::XorEquals => assign::xor_equals(ev, result, left, right),
        OpCode::Inc => assign::increment(ev, result, left, right),
        OpCode::Dec => assign::decrement(ev, result, left, right),

        OpCode::Add => math::add(ev, result, left, right),
        OpCode::Sub => math::subtract(ev, result, left, right),
        OpCode::Mul => math::multiply(ev, result, left, right),
        OpCode::Div => math::divide(ev, result, left, right),

        OpCode::Band => bitwise::band(ev, result, left, right),
        OpCode::Bor => bitwise::bor(ev, result, left, right),
        OpCode::Xor => bitwise::xor(ev, result, left, right),
        OpCode::LShift => bitwise::lshift(ev, result, left, right),
        OpCode::RShift => bitwise::rshift(ev, result, left, right),

        OpCode::And => boolean::and(ev, result, left, right),
        OpCode::Or => boolean::or(ev, result, left, right),
        OpCode::Not => boolean::not(ev, result, left, right),

        OpCode::Equals => compare::equals(ev, result, left, right),
        OpCode::NotEquals => compare::not_equals(ev, result, left, right),
        OpCode::Gt => compare::greater_than(ev, result, left, right),
        OpCode::Lt => compare::less_than(ev, result, left, right),
        OpCode::Gte => compare::greater_or_equal(ev, result, left, right),
        OpCode::Lte => compare::less_or_equal(ev, result, left, right),

        OpCode::ToFloat => typecast::to_float(ev, result, left),
        OpCode::ToInt => typecast::to_int(ev, result, left),
        OpCode::ToShort => typecast::to_short(ev, result, left),
        OpCode::ToString => typecast::to_string(ev, result, left, right),

        OpCode::CreateTimer => timers::create_timer(ev, result, left, right),
        OpCode::CreateTick => timers::create_tick(ev, result, left, right),
        OpCode::DeleteTimer => timers::delete_timer(ev, result, left),
        OpCode::ActiveTimer => timers::active_timer(ev, result),

        OpCode::Sysvar => eval::fetch_sysvar(ev, result),

        // Literals and already-materialized references carry their value.
        OpCode::Num
        | OpCode::FloatNum
        | OpCode::LocalVar
        | OpCode::StringLit
        | OpCode::Timer => Ok(()),

        OpCode::Illegal | OpCode::If | OpCode::Else => {
            warn!(op = op.name(), "no handler for operation");
            Err(EvalError::Unsupported(op.name()))
        }
    }
}
