//! Evaluation engine for var/action scripts.
//!
//! A host parses script source into a typed node graph and hands it to an
//! [`Engine`] for evaluation. Variables may be script-local or live in an
//! external variable store reached through the [`VarStore`] trait; scripts
//! can also arm timers and delegate command lines to the shell.
//!
//! ```
//! use varscript::{Branch, Engine, MemoryStore, OpCode, Value, VarType};
//!
//! let mut engine = Engine::new(MemoryStore::new());
//!
//! // x = 5 + 3
//! let x = engine.new_identifier("x", true).unwrap();
//! engine.program.declare(x, VarType::Uint16);
//! let five = engine.program.new_number("5");
//! let three = engine.program.new_number("3");
//! let sum = engine.program.new_operation(
//!     OpCode::Add,
//!     Some(Branch::Expr(five)),
//!     Some(Branch::Expr(three)),
//! );
//! let assign = engine.program.new_operation(
//!     OpCode::Assign,
//!     Some(Branch::Expr(x)),
//!     Some(Branch::Expr(sum)),
//! );
//!
//! engine.eval_node(assign).unwrap();
//! assert_eq!(engine.program.node(x).value, Value::Uint16(8));
//! ```

pub mod error;
pub mod script;
pub mod store;
pub mod timer;

pub use error::{EvalError, StoreError};
pub use script::{
    BlockId, Branch, CommandRunner, Engine, Node, NodeId, OpCode, Program, Stmt, StrBuf, Value,
    VarType, MIN_BUFSIZE,
};
pub use store::{MemoryStore, VarHandle, VarStore};
pub use timer::{TimerTable, MAX_TIMER_ID};
