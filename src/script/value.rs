//! Typed value model for the script engine.
//!
//! Four representations: 16-bit unsigned, 32-bit unsigned, 32-bit float and
//! byte string. A node's value keeps its representation for the node's
//! lifetime; operator dispatch keys off the left operand's representation.
//! String payloads live in shared grow-only buffers ([`StrBuf`]) so that
//! string assignment can alias the target's buffer into the result node.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::script::strings::StrBuf;

/// Shared handle to a string buffer.
pub type StrRef = Rc<RefCell<StrBuf>>;

/// The type tag of a value, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    Uint16,
    Uint32,
    Float,
    Str,
}

/// A script value.
///
/// `Str(None)` is a string-typed value with no buffer yet; the first
/// assignment or format into it allocates one.
#[derive(Debug, Clone)]
pub enum Value {
    Uint16(u16),
    Uint32(u32),
    Float(f32),
    Str(Option<StrRef>),
}

impl Value {
    /// The zero value of a given type.
    pub fn default_for(ty: VarType) -> Value {
        match ty {
            VarType::Uint16 => Value::Uint16(0),
            VarType::Uint32 => Value::Uint32(0),
            VarType::Float => Value::Float(0.0),
            VarType::Str => Value::Str(None),
        }
    }

    pub fn var_type(&self) -> VarType {
        match self {
            Value::Uint16(_) => VarType::Uint16,
            Value::Uint32(_) => VarType::Uint32,
            Value::Float(_) => VarType::Float,
            Value::Str(_) => VarType::Str,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Uint16(_) => "uint16",
            Value::Uint32(_) => "uint32",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    /// Read as a 16-bit unsigned value, truncating wider representations.
    pub fn as_u16(&self) -> u16 {
        match self {
            Value::Uint16(v) => *v,
            Value::Uint32(v) => *v as u16,
            Value::Float(f) => *f as u16,
            Value::Str(_) => 0,
        }
    }

    /// Read as a 32-bit unsigned value.
    pub fn as_u32(&self) -> u32 {
        match self {
            Value::Uint16(v) => u32::from(*v),
            Value::Uint32(v) => *v,
            Value::Float(f) => *f as u32,
            Value::Str(_) => 0,
        }
    }

    /// Read as a float.
    pub fn as_f32(&self) -> f32 {
        match self {
            Value::Uint16(v) => f32::from(*v),
            Value::Uint32(v) => *v as f32,
            Value::Float(f) => *f,
            Value::Str(_) => 0.0,
        }
    }

    /// The string buffer handle, if this is a string with one.
    pub fn str_ref(&self) -> Option<StrRef> {
        match self {
            Value::Str(Some(s)) => Some(Rc::clone(s)),
            _ => None,
        }
    }

    /// A copy of the string bytes; empty for an absent buffer.
    pub fn str_bytes(&self) -> Vec<u8> {
        match self {
            Value::Str(Some(s)) => s.borrow().as_bytes().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Truthiness: nonzero for numerics, non-empty for strings.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Uint16(v) => *v != 0,
            Value::Uint32(v) => *v != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(None) => false,
            Value::Str(Some(s)) => !s.borrow().is_empty(),
        }
    }

    /// Copy that shares nothing with the original. Plain `clone` shares the
    /// string buffer; this one duplicates it.
    pub fn deep_clone(&self) -> Value {
        match self {
            Value::Str(Some(s)) => {
                let fresh = StrBuf::from_bytes(s.borrow().as_bytes());
                Value::Str(Some(Rc::new(RefCell::new(fresh))))
            }
            other => other.clone(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Uint16(a), Value::Uint16(b)) => a == b,
            (Value::Uint32(a), Value::Uint32(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(None), Value::Str(None)) => true,
            (Value::Str(Some(a)), Value::Str(Some(b))) => {
                a.borrow().as_bytes() == b.borrow().as_bytes()
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uint16(v) => write!(f, "{v}"),
            Value::Uint32(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(None) => Ok(()),
            Value::Str(Some(s)) => {
                write!(f, "{}", String::from_utf8_lossy(s.borrow().as_bytes()))
            }
        }
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Uint16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint32(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Uint16(u16::from(v))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Some(Rc::new(RefCell::new(StrBuf::from_bytes(s.as_bytes())))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_truncate() {
        assert_eq!(Value::Uint32(0x1_0005).as_u16(), 5);
        assert_eq!(Value::Float(3.9).as_u16(), 3);
        assert_eq!(Value::Uint16(7).as_u32(), 7);
        assert_eq!(Value::Uint16(7).as_f32(), 7.0);
    }

    #[test]
    fn truthiness() {
        assert!(Value::Uint16(1).is_truthy());
        assert!(!Value::Uint16(0).is_truthy());
        assert!(Value::Uint32(0x10000).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Str(None).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
    }

    #[test]
    fn clone_shares_deep_clone_does_not() {
        let a = Value::from("abc");
        let shallow = a.clone();
        let deep = a.deep_clone();

        if let Value::Str(Some(buf)) = &a {
            buf.borrow_mut().set(b"xyz").unwrap();
        }
        assert_eq!(shallow, Value::from("xyz"));
        assert_eq!(deep, Value::from("abc"));
    }

    #[test]
    fn display_renders_each_type() {
        assert_eq!(Value::Uint16(12).to_string(), "12");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::Str(None).to_string(), "");
    }
}
