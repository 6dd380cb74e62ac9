//! Grow-only string buffer manager.
//!
//! Script strings live in [`StrBuf`] buffers that start at 32 bytes, keep
//! capacity at least one byte past the content, and never shrink. Buffers
//! are shared between nodes through `Rc<RefCell<_>>` handles: assignment
//! aliases the target's buffer into the result node, so later writes through
//! either handle are visible through both.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::EvalError;
use crate::script::eval::Engine;
use crate::script::node::NodeId;
use crate::script::value::{StrRef, Value};
use crate::store::VarStore;

/// Smallest buffer ever allocated.
pub const MIN_BUFSIZE: usize = 32;

/// A growable byte-string buffer.
///
/// Capacity is always at least `MIN_BUFSIZE` and at least `len + 1`; growth
/// goes through `try_reserve` so allocation failure surfaces as
/// [`EvalError::OutOfMemory`] instead of aborting.
#[derive(Debug)]
pub struct StrBuf {
    data: Vec<u8>,
    len: usize,
}

impl StrBuf {
    /// Empty buffer at the minimum capacity.
    pub fn new() -> StrBuf {
        StrBuf {
            data: vec![0; MIN_BUFSIZE],
            len: 0,
        }
    }

    /// Buffer initialized with `bytes`, sized `max(MIN_BUFSIZE, len + 1)`.
    pub fn from_bytes(bytes: &[u8]) -> StrBuf {
        let cap = MIN_BUFSIZE.max(bytes.len() + 1);
        let mut data = vec![0; cap];
        data[..bytes.len()].copy_from_slice(bytes);
        StrBuf {
            data,
            len: bytes.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current allocated size.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }

    /// Grow (never shrink) so that content of `len` bytes fits with one
    /// spare byte.
    pub fn reserve_for(&mut self, len: usize) -> Result<(), EvalError> {
        let need = MIN_BUFSIZE.max(len + 1);
        if need > self.data.len() {
            self.data
                .try_reserve(need - self.data.len())
                .map_err(|_| EvalError::OutOfMemory)?;
            self.data.resize(need, 0);
        }
        Ok(())
    }

    /// Replace the content.
    pub fn set(&mut self, bytes: &[u8]) -> Result<(), EvalError> {
        self.reserve_for(bytes.len())?;
        self.data[..bytes.len()].copy_from_slice(bytes);
        self.data[bytes.len()] = 0;
        self.len = bytes.len();
        Ok(())
    }

    /// Append to the content.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), EvalError> {
        let new_len = self.len + bytes.len();
        self.reserve_for(new_len)?;
        self.data[self.len..new_len].copy_from_slice(bytes);
        self.data[new_len] = 0;
        self.len = new_len;
        Ok(())
    }
}

impl Default for StrBuf {
    fn default() -> Self {
        StrBuf::new()
    }
}

/// The node's buffer handle, allocating one if the node is string-typed but
/// has no buffer yet.
pub(crate) fn ensure_buf<S: VarStore>(
    ev: &mut Engine<S>,
    id: NodeId,
) -> Result<StrRef, EvalError> {
    match &ev.program.node(id).value {
        Value::Str(Some(s)) => Ok(Rc::clone(s)),
        Value::Str(None) => {
            let buf: StrRef = Rc::new(RefCell::new(StrBuf::new()));
            ev.program.node_mut(id).value = Value::Str(Some(Rc::clone(&buf)));
            Ok(buf)
        }
        _ => Err(EvalError::InvalidArgument),
    }
}

/// String assignment: copy the right operand's bytes into the left node's
/// own buffer, then alias that buffer into the result node.
pub(crate) fn assign_string<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: NodeId,
    right: NodeId,
) -> Result<(), EvalError> {
    // Copy first: left and right may share a buffer.
    let bytes = match &ev.program.node(right).value {
        Value::Str(s) => s
            .as_ref()
            .map(|b| b.borrow().as_bytes().to_vec())
            .unwrap_or_default(),
        _ => return Err(EvalError::Unsupported("Assign")),
    };
    let buf = ensure_buf(ev, left)?;
    buf.borrow_mut().set(&bytes)?;
    ev.program.node_mut(result).value = Value::Str(Some(buf));
    Ok(())
}

/// `+=` on strings: append the right operand to the left node's buffer and
/// alias it into the result node.
pub(crate) fn concat_string<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: NodeId,
    right: NodeId,
) -> Result<(), EvalError> {
    let bytes = match &ev.program.node(right).value {
        Value::Str(Some(s)) => s.borrow().as_bytes().to_vec(),
        _ => return Err(EvalError::Unsupported("PlusEquals")),
    };
    let buf = ensure_buf(ev, left)?;
    buf.borrow_mut().append(&bytes)?;
    ev.program.node_mut(result).value = Value::Str(Some(buf));
    Ok(())
}

/// `+` on strings: write the concatenation into the result node's own
/// buffer. Both operands must have buffers.
pub(crate) fn add_string<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: NodeId,
    right: NodeId,
) -> Result<(), EvalError> {
    let mut bytes = match &ev.program.node(left).value {
        Value::Str(Some(s)) => s.borrow().as_bytes().to_vec(),
        _ => return Err(EvalError::Unsupported("Add")),
    };
    match &ev.program.node(right).value {
        Value::Str(Some(s)) => bytes.extend_from_slice(s.borrow().as_bytes()),
        _ => return Err(EvalError::Unsupported("Add")),
    }
    let buf = ensure_buf(ev, result)?;
    buf.borrow_mut().set(&bytes)?;
    Ok(())
}
