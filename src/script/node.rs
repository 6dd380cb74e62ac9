//! Script graph: nodes, statements and the owning `Program` arena.
//!
//! Nodes (literals, variable references, operations) live in one arena owned
//! by the [`Program`]; children are referenced by [`NodeId`]. A child slot
//! is a [`Branch`], which is either another expression node or a statement
//! block (IF bodies). Identifier aliasing is structural: resolving the same
//! name twice yields the same `NodeId`, so mutation through one reference is
//! visible through every other.

use crate::script::registry::OpCode;
use crate::script::value::{Value, VarType};
use crate::store::VarHandle;

/// Handle to a node in the program arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// Handle to a statement block in the program arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

/// A child of an operation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// An expression subtree.
    Expr(NodeId),
    /// A statement block (IF/ELSE bodies).
    Block(BlockId),
}

/// One statement: an expression to evaluate, or an external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Expr(NodeId),
    Command(String),
}

/// A node in the script graph.
#[derive(Debug)]
pub struct Node {
    pub op: OpCode,
    /// Identifier name, for variable references.
    pub id: Option<String>,
    /// Declared locally rather than resolved from the external store.
    pub local: bool,
    /// A value has been assigned since declaration.
    pub assigned: bool,
    /// This reference is an assignment target; skip the store fetch.
    pub lvalue: bool,
    /// External store handle, for `Sysvar` nodes.
    pub handle: Option<VarHandle>,
    pub value: Value,
    pub left: Option<Branch>,
    pub right: Option<Branch>,
}

impl Node {
    fn new(op: OpCode) -> Node {
        Node {
            op,
            id: None,
            local: false,
            assigned: false,
            lvalue: false,
            handle: None,
            value: Value::Uint16(0),
            left: None,
            right: None,
        }
    }
}

/// The arena owning every node and statement block of one script.
#[derive(Debug, Default)]
pub struct Program {
    nodes: Vec<Node>,
    blocks: Vec<Vec<Stmt>>,
    declarations: Vec<NodeId>,
    sysvars: Vec<NodeId>,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn cache_sysvar(&mut self, id: NodeId) {
        self.sysvars.push(id);
    }

    pub(crate) fn add_declaration(&mut self, id: NodeId) {
        self.declarations.push(id);
    }

    /// Store a statement block, returning its handle.
    pub fn new_block(&mut self, stmts: Vec<Stmt>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(stmts);
        id
    }

    pub fn block(&self, id: BlockId) -> &[Stmt] {
        &self.blocks[id.0 as usize]
    }

    /// Integer literal node from source text.
    ///
    /// Decimal or `0x` hex; a trailing `U` requests 16-bit, `L` 32-bit.
    /// Values outside [-32768, 65535] are promoted to 32-bit regardless;
    /// unsuffixed in-range values default to 16-bit.
    pub fn new_number(&mut self, text: &str) -> NodeId {
        let mut digits = text.trim();
        let mut requested = None;
        if let Some(stripped) = digits.strip_suffix(&['u', 'U'][..]) {
            requested = Some(VarType::Uint16);
            digits = stripped;
        } else if let Some(stripped) = digits.strip_suffix(&['l', 'L'][..]) {
            requested = Some(VarType::Uint32);
            digits = stripped;
        }

        let (negative, body) = match digits.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, digits),
        };
        let magnitude = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X"))
        {
            i64::from_str_radix(hex, 16).unwrap_or(0)
        } else {
            body.parse::<i64>().unwrap_or(0)
        };
        let n = if negative { -magnitude } else { magnitude };

        let ty = if !(-32768..=65535).contains(&n) {
            VarType::Uint32
        } else {
            requested.unwrap_or(VarType::Uint16)
        };

        let mut node = Node::new(OpCode::Num);
        node.value = match ty {
            VarType::Uint32 => Value::Uint32(n as u32),
            _ => Value::Uint16(n as u16),
        };
        node.assigned = true;
        self.push(node)
    }

    /// Float literal node from source text.
    pub fn new_float(&mut self, text: &str) -> NodeId {
        let mut node = Node::new(OpCode::FloatNum);
        node.value = Value::Float(text.trim().parse().unwrap_or(0.0));
        node.assigned = true;
        self.push(node)
    }

    /// String literal node.
    pub fn new_string(&mut self, text: &str) -> NodeId {
        let mut node = Node::new(OpCode::StringLit);
        node.value = Value::from(text);
        node.assigned = true;
        self.push(node)
    }

    /// Operation node over up to two children.
    ///
    /// The result type is stamped from the operation where it determines one
    /// (string literal/cast, IF/ELSE), otherwise from the children's common
    /// type, falling back to the left child's type since runtime dispatch
    /// keys off the left operand.
    pub fn new_operation(
        &mut self,
        op: OpCode,
        left: Option<Branch>,
        right: Option<Branch>,
    ) -> NodeId {
        let ty = match op {
            OpCode::StringLit | OpCode::ToString => VarType::Str,
            OpCode::ToFloat => VarType::Float,
            OpCode::If | OpCode::Else => VarType::Uint16,
            _ => {
                let lt = branch_type(self, left);
                let rt = branch_type(self, right);
                match (lt, rt) {
                    (Some(a), Some(b)) if a == b => a,
                    (Some(a), _) => a,
                    (None, Some(b)) => b,
                    (None, None) => VarType::Uint16,
                }
            }
        };
        let mut node = Node::new(op);
        node.value = Value::default_for(ty);
        node.left = left;
        node.right = right;
        self.push(node)
    }

    /// Common type of two nodes, or `None` on mismatch.
    pub fn type_check(&self, a: NodeId, b: NodeId) -> Option<VarType> {
        let ta = self.node(a).value.var_type();
        let tb = self.node(b).value.var_type();
        (ta == tb).then_some(ta)
    }

    /// Stamp a declared local with its type.
    pub fn declare(&mut self, id: NodeId, ty: VarType) {
        let node = self.node_mut(id);
        node.value = Value::default_for(ty);
        node.assigned = false;
    }

    /// Declared local with this name, if any.
    pub fn find_local(&self, name: &str) -> Option<NodeId> {
        self.declarations
            .iter()
            .copied()
            .find(|&id| self.node(id).id.as_deref() == Some(name))
    }

    /// Cached external reference with this name, if any.
    pub fn find_sysvar(&self, name: &str) -> Option<NodeId> {
        self.sysvars
            .iter()
            .copied()
            .find(|&id| self.node(id).id.as_deref() == Some(name))
    }

    /// New declared-local reference node. The caller stamps the type with
    /// [`Program::declare`].
    pub fn new_local(&mut self, name: &str) -> NodeId {
        let mut node = Node::new(OpCode::LocalVar);
        node.id = Some(name.to_owned());
        node.local = true;
        let id = self.push(node);
        self.add_declaration(id);
        id
    }

    /// New external-reference node, already carrying the store handle and
    /// the value read at resolution time. Cached for later lookups by name.
    pub(crate) fn new_sysvar(&mut self, name: &str, handle: VarHandle, value: Value) -> NodeId {
        let mut node = Node::new(OpCode::Sysvar);
        node.id = Some(name.to_owned());
        node.handle = Some(handle);
        node.assigned = true;
        node.value = value;
        let id = self.push(node);
        self.cache_sysvar(id);
        id
    }

    /// True when the node is a local that has never been assigned.
    ///
    /// Shallow check: only the node itself is inspected, not its subtree.
    pub fn used_before_assignment(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.local && !node.assigned
    }

    pub fn mark_assigned(&mut self, id: NodeId) {
        self.node_mut(id).assigned = true;
    }
}

fn branch_type(p: &Program, branch: Option<Branch>) -> Option<VarType> {
    match branch {
        Some(Branch::Expr(id)) => Some(p.node(id).value.var_type()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_literal_widths() {
        let mut p = Program::new();

        let n = p.new_number("42");
        assert_eq!(p.node(n).value, Value::Uint16(42));

        let n = p.new_number("42U");
        assert_eq!(p.node(n).value, Value::Uint16(42));

        let n = p.new_number("42L");
        assert_eq!(p.node(n).value, Value::Uint32(42));

        // Out of the 16-bit range: promoted even with a U suffix.
        let n = p.new_number("70000U");
        assert_eq!(p.node(n).value, Value::Uint32(70000));

        let n = p.new_number("0x1F");
        assert_eq!(p.node(n).value, Value::Uint16(31));

        let n = p.new_number("0xFFFFFFFF");
        assert_eq!(p.node(n).value, Value::Uint32(0xFFFF_FFFF));

        let n = p.new_number("-1");
        assert_eq!(p.node(n).value, Value::Uint16(0xFFFF));
    }

    #[test]
    fn float_and_string_literals() {
        let mut p = Program::new();
        let f = p.new_float("2.5");
        assert_eq!(p.node(f).value, Value::Float(2.5));

        let s = p.new_string("hello");
        assert_eq!(p.node(s).value, Value::from("hello"));
        assert_eq!(p.node(s).op, OpCode::StringLit);
    }

    #[test]
    fn operation_type_stamping() {
        let mut p = Program::new();
        let a = p.new_number("1");
        let b = p.new_number("2L");

        // Mismatched children: left child's type wins.
        let add = p.new_operation(
            OpCode::Add,
            Some(Branch::Expr(a)),
            Some(Branch::Expr(b)),
        );
        assert_eq!(p.node(add).value.var_type(), VarType::Uint16);

        let cast = p.new_operation(OpCode::ToString, Some(Branch::Expr(a)), None);
        assert_eq!(p.node(cast).value.var_type(), VarType::Str);

        assert_eq!(p.type_check(a, b), None);
        let c = p.new_number("3");
        assert_eq!(p.type_check(a, c), Some(VarType::Uint16));
    }

    #[test]
    fn declaration_and_use_before_assignment() {
        let mut p = Program::new();
        let x = p.new_local("x");
        p.declare(x, VarType::Uint32);

        assert_eq!(p.find_local("x"), Some(x));
        assert!(p.used_before_assignment(x));

        p.mark_assigned(x);
        assert!(!p.used_before_assignment(x));

        // Literals are never flagged.
        let n = p.new_number("5");
        assert!(!p.used_before_assignment(n));
    }
}
