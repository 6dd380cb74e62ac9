//! The evaluator.
//!
//! [`Engine`] bundles everything one script needs at run time: the node
//! graph, the external variable store, the timer table and the optional
//! command-runner override. Evaluation walks the graph synchronously;
//! expression children are evaluated right subtree first, then left, and a
//! child's failure does not stop the parent from running its handler. Only
//! the top node's handler status propagates to the caller.

use std::sync::Arc;

use tracing::error;

use crate::error::EvalError;
use crate::script::node::{BlockId, Branch, NodeId, Program, Stmt};
use crate::script::registry::{self, OpCode};
use crate::script::value::Value;
use crate::store::{VarHandle, VarStore};
use crate::timer::TimerTable;

/// Override for external-command delegation; receives the command line.
pub type CommandRunner = Arc<dyn Fn(&str) + Send + Sync>;

/// Evaluation context for one script.
pub struct Engine<S: VarStore> {
    pub program: Program,
    pub store: S,
    pub timers: TimerTable,
    command_runner: Option<CommandRunner>,
}

impl<S: VarStore> Engine<S> {
    pub fn new(store: S) -> Engine<S> {
        Engine {
            program: Program::new(),
            store,
            timers: TimerTable::new(),
            command_runner: None,
        }
    }

    /// Replace the default `sh -c` delegation with a callback.
    pub fn with_command_runner(mut self, runner: CommandRunner) -> Engine<S> {
        self.command_runner = Some(runner);
        self
    }

    /// Resolve an identifier to its node.
    ///
    /// A declaration always creates a fresh local. Otherwise locals shadow
    /// externals, cached references are reused (so every mention of a name
    /// shares one node), and an unknown name is resolved through the store:
    /// on success the node is created with the value read immediately, on
    /// failure no node is created at all.
    pub fn new_identifier(&mut self, name: &str, declaration: bool) -> Result<NodeId, EvalError> {
        if declaration {
            return Ok(self.program.new_local(name));
        }
        if let Some(id) = self.program.find_local(name) {
            return Ok(id);
        }
        if let Some(id) = self.program.find_sysvar(name) {
            return Ok(id);
        }
        let handle = self
            .store
            .resolve_name(name)
            .ok_or_else(|| EvalError::NotFound(name.to_owned()))?;
        let value = self.store.get(handle)?;
        Ok(self.program.new_sysvar(name, handle, value))
    }

    /// Evaluate a statement block: every statement is attempted, and the
    /// status of the last failing one (if any) is returned.
    pub fn eval_block(&mut self, block: BlockId) -> Result<(), EvalError> {
        let stmts = self.program.block(block).to_vec();
        let mut rc = Ok(());
        for stmt in &stmts {
            if let Err(e) = self.eval_stmt(stmt) {
                rc = Err(e);
            }
        }
        rc
    }

    pub fn eval_stmt(&mut self, stmt: &Stmt) -> Result<(), EvalError> {
        match stmt {
            Stmt::Expr(id) => self.eval_node(*id),
            Stmt::Command(line) => self.eval_command(line),
        }
    }

    /// Evaluate one node. Failures are logged with the operation's name.
    pub fn eval_node(&mut self, id: NodeId) -> Result<(), EvalError> {
        let node = self.program.node(id);
        let op = node.op;
        let (left, right) = (node.left, node.right);
        let rc = if op == OpCode::If {
            self.eval_if(left, right)
        } else {
            self.eval_expr(id, op, left, right)
        };
        if let Err(e) = &rc {
            error!(op = op.name(), error = %e, "error processing operation");
        }
        rc
    }

    fn eval_expr(
        &mut self,
        id: NodeId,
        op: OpCode,
        left: Option<Branch>,
        right: Option<Branch>,
    ) -> Result<(), EvalError> {
        // Child failures do not gate the parent handler.
        if let Some(Branch::Expr(r)) = right {
            let _ = self.eval_node(r);
        }
        if let Some(Branch::Expr(l)) = left {
            let _ = self.eval_node(l);
        }
        let left_id = match left {
            Some(Branch::Expr(n)) => Some(n),
            _ => None,
        };
        let right_id = match right {
            Some(Branch::Expr(n)) => Some(n),
            _ => None,
        };
        registry::apply(self, op, id, left_id, right_id)
    }

    /// IF: the left child is the condition expression, the right child must
    /// be an ELSE node whose left/right children are the then/else blocks
    /// (the else block may be absent). Integer conditions test their low 16
    /// bits raw; float and string conditions are rejected.
    fn eval_if(&mut self, left: Option<Branch>, right: Option<Branch>) -> Result<(), EvalError> {
        let (Some(Branch::Expr(cond)), Some(Branch::Expr(else_id))) = (left, right) else {
            return Err(EvalError::InvalidArgument);
        };
        if self.program.node(else_id).op != OpCode::Else {
            return Err(EvalError::InvalidArgument);
        }
        self.eval_node(cond)?;
        let truth = match self.program.node(cond).value {
            Value::Uint16(v) => v != 0,
            Value::Uint32(v) => v as u16 != 0,
            Value::Float(_) | Value::Str(_) => return Err(EvalError::Unsupported("If")),
        };
        let branch = if truth {
            self.program.node(else_id).left
        } else {
            self.program.node(else_id).right
        };
        match branch {
            Some(Branch::Block(b)) => self.eval_block(b),
            None if !truth => Ok(()),
            _ => Err(EvalError::InvalidArgument),
        }
    }

    /// Delegate a command line to the shell (or the configured runner).
    /// The command's exit status is not inspected; delegation itself is
    /// the success condition.
    pub fn eval_command(&mut self, line: &str) -> Result<(), EvalError> {
        if let Some(runner) = &self.command_runner {
            runner(line);
            return Ok(());
        }
        let _ = std::process::Command::new("sh").arg("-c").arg(line).status();
        Ok(())
    }
}

/// Handler for external-reference nodes: refresh the cached value from the
/// store, unless the node is an assignment target (the fetched value would
/// be overwritten before anyone read it).
pub(crate) fn fetch_sysvar<S: VarStore>(ev: &mut Engine<S>, id: NodeId) -> Result<(), EvalError> {
    let node = ev.program.node(id);
    if node.op != OpCode::Sysvar {
        return Err(EvalError::InvalidArgument);
    }
    let handle: VarHandle = node.handle.ok_or(EvalError::InvalidArgument)?;
    if node.lvalue {
        return Ok(());
    }
    let value = ev.store.get(handle)?;
    ev.program.node_mut(id).value = value;
    Ok(())
}
