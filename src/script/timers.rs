//! Timer operation handlers.
//!
//! Each handler reads its operands, drives the [`TimerTable`] and leaves a
//! 16-bit 1/0 success flag in the result node in addition to returning the
//! status code, so scripts can test the outcome inline.

use crate::error::EvalError;
use crate::script::eval::Engine;
use crate::script::node::NodeId;
use crate::script::registry::{operand, operands};
use crate::script::value::Value;
use crate::store::VarStore;

fn flag<S: VarStore>(ev: &mut Engine<S>, result: NodeId, ok: bool) {
    ev.program.node_mut(result).value = Value::from(ok);
}

/// `create_timer(id, delay_ms)`: arm a one-shot timer.
pub(crate) fn create_timer<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    let (l, r) = operands(left, right)?;
    let id = ev.program.node(l).value.as_u16();
    let delay_ms = ev.program.node(r).value.as_u32();
    let rc = ev.timers.create_timer(id, delay_ms);
    flag(ev, result, rc.is_ok());
    rc
}

/// `create_tick(id, period_ms)`: arm a periodic tick.
pub(crate) fn create_tick<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    let (l, r) = operands(left, right)?;
    let id = ev.program.node(l).value.as_u16();
    let period_ms = ev.program.node(r).value.as_u32();
    let rc = ev.timers.create_tick(id, period_ms);
    flag(ev, result, rc.is_ok());
    rc
}

/// `delete_timer(id)`: disarm.
pub(crate) fn delete_timer<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
) -> Result<(), EvalError> {
    let l = operand(left)?;
    let id = ev.program.node(l).value.as_u16();
    let rc = ev.timers.delete_timer(id);
    flag(ev, result, rc.is_ok());
    rc
}

/// `active_timer()`: the most recently expired timer id, 0 when none.
pub(crate) fn active_timer<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
) -> Result<(), EvalError> {
    let id = ev.timers.active_timer();
    ev.program.node_mut(result).value = Value::Uint16(id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::node::Branch;
    use crate::script::registry::OpCode;
    use crate::store::MemoryStore;
    use std::time::Duration;
    use tokio::time::advance;

    fn timer_node(
        ev: &mut Engine<MemoryStore>,
        op: OpCode,
        id: &str,
        arg: Option<&str>,
    ) -> NodeId {
        let l = ev.program.new_number(id);
        let r = arg.map(|a| Branch::Expr(ev.program.new_number(a)));
        ev.program.new_operation(op, Some(Branch::Expr(l)), r)
    }

    #[tokio::test(start_paused = true)]
    async fn create_then_observe_active() {
        let mut ev = Engine::new(MemoryStore::new());
        let create = timer_node(&mut ev, OpCode::CreateTimer, "6", Some("100"));
        ev.eval_node(create).unwrap();
        assert_eq!(ev.program.node(create).value, Value::Uint16(1));

        // First poll registers the deadline; only then move the clock.
        tokio::task::yield_now().await;
        advance(Duration::from_millis(101)).await;
        tokio::task::yield_now().await;

        let active = ev.program.new_operation(OpCode::ActiveTimer, None, None);
        ev.eval_node(active).unwrap();
        assert_eq!(ev.program.node(active).value, Value::Uint16(6));
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_id_fails_with_zero_flag() {
        let mut ev = Engine::new(MemoryStore::new());
        let create = timer_node(&mut ev, OpCode::CreateTimer, "300", Some("10"));
        assert!(matches!(ev.eval_node(create), Err(EvalError::NotFound(_))));
        assert_eq!(ev.program.node(create).value, Value::Uint16(0));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_unarmed_fails() {
        let mut ev = Engine::new(MemoryStore::new());
        let del = timer_node(&mut ev, OpCode::DeleteTimer, "12", None);
        assert!(matches!(ev.eval_node(del), Err(EvalError::NotFound(_))));
        assert_eq!(ev.program.node(del).value, Value::Uint16(0));
    }

    #[tokio::test(start_paused = true)]
    async fn tick_delete_cycle() {
        let mut ev = Engine::new(MemoryStore::new());
        let tick = timer_node(&mut ev, OpCode::CreateTick, "2", Some("50"));
        ev.eval_node(tick).unwrap();
        assert!(ev.timers.is_armed(2));

        let del = timer_node(&mut ev, OpCode::DeleteTimer, "2", None);
        ev.eval_node(del).unwrap();
        assert_eq!(ev.program.node(del).value, Value::Uint16(1));
        assert!(!ev.timers.is_armed(2));
    }
}
