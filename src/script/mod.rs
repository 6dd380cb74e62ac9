//! The script language core.
//!
//! A script is a graph of typed nodes ([`node::Program`]) evaluated by an
//! [`eval::Engine`]. The submodules split along the operation families:
//!
//! - [`value`] / [`strings`] — the typed value model and string buffers
//! - [`node`] — the graph arena, literal builders and symbol resolution
//! - [`registry`] — the operation tag set and handler dispatch
//! - [`assign`], [`math`], [`bitwise`], [`boolean`], [`compare`],
//!   [`typecast`], [`timers`] — the operation handlers
//! - [`eval`] — statement, block, IF and expression evaluation

pub mod assign;
pub mod bitwise;
pub mod boolean;
pub mod compare;
pub mod eval;
pub mod math;
pub mod node;
pub mod registry;
pub mod strings;
pub mod timers;
pub mod typecast;
pub mod value;

pub use eval::{CommandRunner, Engine};
pub use node::{BlockId, Branch, Node, NodeId, Program, Stmt};
pub use registry::OpCode;
pub use strings::{StrBuf, MIN_BUFSIZE};
pub use value::{Value, VarType};
