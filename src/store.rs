//! External variable-store boundary.
//!
//! Script graphs reference variables that live outside the process in a
//! variable server. The engine talks to it through the [`VarStore`] trait:
//! resolve a name to an opaque handle once, then read and write values
//! through the handle. [`MemoryStore`] is the in-process implementation used
//! by tests and by hosts that have no external server.

use crate::error::StoreError;
use crate::script::value::Value;

/// Opaque handle for an externally stored variable.
///
/// Obtained from [`VarStore::resolve_name`] and treated as a token; the
/// engine never inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarHandle(pub u32);

/// Interface to the external variable store.
pub trait VarStore {
    /// Resolve a variable name to a handle, or `None` when the store has no
    /// such variable.
    fn resolve_name(&mut self, name: &str) -> Option<VarHandle>;

    /// Read the current value of a variable.
    fn get(&mut self, handle: VarHandle) -> Result<Value, StoreError>;

    /// Write a new value for a variable.
    fn set(&mut self, handle: VarHandle, value: &Value) -> Result<(), StoreError>;
}

/// In-memory variable store.
///
/// Values cross the boundary by copy in both directions, the way they would
/// over a real server connection; string buffers are never shared with the
/// engine's graph.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Vec<(String, Value)>,
    sets: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a variable, returning its handle.
    pub fn insert(&mut self, name: &str, value: Value) -> VarHandle {
        if let Some(pos) = self.slots.iter().position(|(n, _)| n == name) {
            self.slots[pos].1 = value.deep_clone();
            return VarHandle(pos as u32);
        }
        self.slots.push((name.to_owned(), value.deep_clone()));
        VarHandle((self.slots.len() - 1) as u32)
    }

    /// Current value by name, if present.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.slots
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.deep_clone())
    }

    /// Number of `set` calls observed since construction.
    pub fn set_count(&self) -> usize {
        self.sets
    }

    fn slot(&self, handle: VarHandle) -> Result<usize, StoreError> {
        let pos = handle.0 as usize;
        if pos < self.slots.len() {
            Ok(pos)
        } else {
            Err(StoreError(format!("invalid handle {}", handle.0)))
        }
    }
}

impl VarStore for MemoryStore {
    fn resolve_name(&mut self, name: &str) -> Option<VarHandle> {
        self.slots
            .iter()
            .position(|(n, _)| n == name)
            .map(|pos| VarHandle(pos as u32))
    }

    fn get(&mut self, handle: VarHandle) -> Result<Value, StoreError> {
        let pos = self.slot(handle)?;
        Ok(self.slots[pos].1.deep_clone())
    }

    fn set(&mut self, handle: VarHandle, value: &Value) -> Result<(), StoreError> {
        let pos = self.slot(handle)?;
        self.slots[pos].1 = value.deep_clone();
        self.sets += 1;
        Ok(())
    }
}
