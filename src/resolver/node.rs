use crate::resolver::qondition::Qondition;
use crate::runtime::value::Value;
use crate::runtime::variable::Variable;
use crate::symbols::Operator;

/// One branch of the operation tree: at most two operands around one
/// operator, plus per-side unary modifiers and eagerly gathered call
/// arguments. Sub-nodes grow where precedence demands a deeper branch.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub left: Option<Operand>,
    pub right: Option<Operand>,
    pub op: Option<Operator>,
    pub left_mod: Option<Operator>,
    pub right_mod: Option<Operator>,
    /// Call arguments attached to the most recent operand, already
    /// evaluated. `Some` with no elements is a zero-argument call.
    pub data: Option<Vec<Value>>,
}

impl Node {
    pub fn with_left(operand: Operand) -> Self {
        Self {
            left: Some(operand),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none()
            && self.right.is_none()
            && self.op.is_none()
            && self.left_mod.is_none()
            && self.right_mod.is_none()
            && self.data.is_none()
    }

    /// A node with both operand slots filled cannot take more input at its
    /// own level.
    pub fn is_full(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

#[derive(Debug, Clone)]
pub enum Operand {
    Value(Value),
    Variable(Variable),
    Sub(Box<Node>),
    Qondition(Qondition),
}

/// A fully built tree for one statement, tagged with the flow signal its
/// completion raises.
#[derive(Debug, Clone)]
pub struct Operation {
    pub tree: Node,
    pub signal: Signal,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    None,
    Return,
    Break,
    Continue,
}

impl Signal {
    pub fn name(self) -> &'static str {
        match self {
            Signal::None => "none",
            Signal::Return => "return",
            Signal::Break => "break",
            Signal::Continue => "continue",
        }
    }
}

/// The outcome of executing one operation: the value it produced and the
/// signal, if any, still traveling outward.
#[derive(Debug, Clone)]
pub struct Flow {
    pub value: Value,
    pub signal: Signal,
    pub target: Option<String>,
}

impl Flow {
    pub fn value(value: Value) -> Self {
        Self {
            value,
            signal: Signal::None,
            target: None,
        }
    }

    pub fn signal(value: Value, signal: Signal, target: Option<String>) -> Self {
        Self {
            value,
            signal,
            target,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.signal == Signal::None
    }
}
