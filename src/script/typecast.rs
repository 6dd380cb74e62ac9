//! Typecast operations: `(float)`, `(int)`, `(short)`, `(string)`.
//!
//! Numeric casts convert the left operand's value to the target width,
//! truncating toward zero from float. Casts from strings parse the longest
//! numeric prefix and yield zero when there is none. `(string)` renders
//! through a printf-subset formatter; the optional right operand supplies
//! the format specifier.

use crate::error::EvalError;
use crate::script::eval::Engine;
use crate::script::node::NodeId;
use crate::script::registry::operand;
use crate::script::strings;
use crate::script::value::Value;
use crate::store::VarStore;

/// Longest leading integer, C `atol` style: optional whitespace, optional
/// sign, digits. No prefix parses as zero.
fn int_prefix(s: &str) -> i64 {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == start {
        return 0;
    }
    t[..i].parse().unwrap_or(0)
}

/// Longest leading float, C `atof` style.
fn float_prefix(s: &str) -> f32 {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let mut seen_digit = false;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        seen_digit = true;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        let mut j = i + 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
            seen_digit = true;
        }
        i = j;
    }
    if !seen_digit {
        return 0.0;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    t[..i].parse().unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy)]
enum FmtArg {
    Int(u32),
    Float(f32),
}

fn pad(body: String, width: usize, zero: bool, left: bool) -> String {
    if body.len() >= width {
        return body;
    }
    let fill = width - body.len();
    if left {
        body + &" ".repeat(fill)
    } else if zero {
        "0".repeat(fill) + &body
    } else {
        " ".repeat(fill) + &body
    }
}

/// Render through a format specifier supporting `%d %i %u %x %X %f %s`
/// with optional `0`/`-` flags, width and precision. Returns `None` when
/// the specifier has no usable conversion, letting the caller fall back
/// to the per-type default.
fn render_spec(spec: &str, arg: FmtArg) -> Option<String> {
    let mut out = String::new();
    let mut chars = spec.chars().peekable();
    let mut converted = false;
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        let mut zero = false;
        let mut left = false;
        loop {
            match chars.peek() {
                Some('0') => {
                    zero = true;
                    chars.next();
                }
                Some('-') => {
                    left = true;
                    chars.next();
                }
                _ => break,
            }
        }
        let mut width = 0usize;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            width = width * 10 + d as usize;
            chars.next();
        }
        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut p = 0usize;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                p = p * 10 + d as usize;
                chars.next();
            }
            precision = Some(p);
        }
        let body = match (chars.next()?, arg) {
            ('d' | 'i' | 'u' | 's', FmtArg::Int(v)) => v.to_string(),
            ('x', FmtArg::Int(v)) => format!("{v:x}"),
            ('X', FmtArg::Int(v)) => format!("{v:X}"),
            ('f', FmtArg::Int(v)) => {
                format!("{:.*}", precision.unwrap_or(6), f64::from(v))
            }
            ('d' | 'i' | 'u', FmtArg::Float(f)) => (f as i64).to_string(),
            ('f' | 's', FmtArg::Float(f)) => {
                format!("{:.*}", precision.unwrap_or(6), f)
            }
            _ => return None,
        };
        out.push_str(&pad(body, width, zero, left));
        converted = true;
    }
    converted.then_some(out)
}

fn render(spec: Option<&str>, arg: FmtArg) -> String {
    if let Some(spec) = spec {
        if let Some(s) = render_spec(spec, arg) {
            return s;
        }
    }
    match arg {
        FmtArg::Int(v) => v.to_string(),
        FmtArg::Float(f) => format!("{f:.6}"),
    }
}

pub(crate) fn to_float<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
) -> Result<(), EvalError> {
    let l = operand(left)?;
    let v = match &ev.program.node(l).value {
        Value::Uint16(v) => f32::from(*v),
        Value::Uint32(v) => *v as f32,
        Value::Float(f) => *f,
        Value::Str(s) => float_prefix(&match s {
            Some(b) => b.borrow().to_string_lossy(),
            None => String::new(),
        }),
    };
    ev.program.node_mut(result).value = Value::Float(v);
    Ok(())
}

pub(crate) fn to_int<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
) -> Result<(), EvalError> {
    let l = operand(left)?;
    let v = match &ev.program.node(l).value {
        Value::Uint16(v) => u32::from(*v),
        Value::Uint32(v) => *v,
        Value::Float(f) => *f as i64 as u32,
        Value::Str(s) => int_prefix(&match s {
            Some(b) => b.borrow().to_string_lossy(),
            None => String::new(),
        }) as u32,
    };
    ev.program.node_mut(result).value = Value::Uint32(v);
    Ok(())
}

pub(crate) fn to_short<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
) -> Result<(), EvalError> {
    let l = operand(left)?;
    let v = match &ev.program.node(l).value {
        Value::Uint16(v) => *v,
        Value::Uint32(v) => *v as u16,
        Value::Float(f) => *f as i64 as u16,
        Value::Str(s) => int_prefix(&match s {
            Some(b) => b.borrow().to_string_lossy(),
            None => String::new(),
        }) as u16,
    };
    ev.program.node_mut(result).value = Value::Uint16(v);
    Ok(())
}

/// `(string)`: render the left operand into the result node's buffer. The
/// buffer is pre-grown to a 64-byte default before the formatted text is
/// written.
pub(crate) fn to_string<S: VarStore>(
    ev: &mut Engine<S>,
    result: NodeId,
    left: Option<NodeId>,
    right: Option<NodeId>,
) -> Result<(), EvalError> {
    let l = operand(left)?;
    let spec = right.and_then(|r| match &ev.program.node(r).value {
        Value::Str(Some(s)) => Some(s.borrow().to_string_lossy()),
        _ => None,
    });

    let rendered = match &ev.program.node(l).value {
        Value::Uint16(v) => render(spec.as_deref(), FmtArg::Int(u32::from(*v))).into_bytes(),
        Value::Uint32(v) => render(spec.as_deref(), FmtArg::Int(*v)).into_bytes(),
        Value::Float(f) => render(spec.as_deref(), FmtArg::Float(*f)).into_bytes(),
        Value::Str(_) => ev.program.node(l).value.str_bytes(),
    };

    let buf = strings::ensure_buf(ev, result)?;
    let mut b = buf.borrow_mut();
    b.reserve_for(63)?;
    b.set(&rendered)?;
    Ok(())
}
