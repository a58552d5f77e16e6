/// A registered operator. Higher `weight` binds tighter; `is_mutator` marks
/// read-modify-write operators which take the assignment path through the
/// tree instead of forming a new branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operator {
    pub kind: OperatorKind,
    pub symbol: &'static str,
    pub weight: u8,
    pub is_mutator: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Accessor,
    Not,
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    And,
    Or,
    Assign,
    AssignAdd,
    AssignSubtract,
    AssignMultiply,
    AssignDivide,
    Reference,
    Optional,
}

impl OperatorKind {
    /// The plain binary operation a mutator applies before writing back.
    pub fn base(self) -> Option<OperatorKind> {
        match self {
            OperatorKind::AssignAdd => Some(OperatorKind::Add),
            OperatorKind::AssignSubtract => Some(OperatorKind::Subtract),
            OperatorKind::AssignMultiply => Some(OperatorKind::Multiply),
            OperatorKind::AssignDivide => Some(OperatorKind::Divide),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Operators {
    entries: Vec<Operator>,
}

impl Operators {
    pub fn new() -> Self {
        let mut operators = Self {
            entries: Vec::new(),
        };
        operators.register(OperatorKind::Accessor, ":", 9, false);
        operators.register(OperatorKind::Not, "!", 8, false);
        operators.register(OperatorKind::Multiply, "*", 6, false);
        operators.register(OperatorKind::Divide, "/", 6, false);
        operators.register(OperatorKind::Modulo, "%", 6, false);
        operators.register(OperatorKind::Add, "+", 5, false);
        operators.register(OperatorKind::Subtract, "-", 5, false);
        operators.register(OperatorKind::Less, "<", 4, false);
        operators.register(OperatorKind::LessEqual, "<=", 4, false);
        operators.register(OperatorKind::Greater, ">", 4, false);
        operators.register(OperatorKind::GreaterEqual, ">=", 4, false);
        operators.register(OperatorKind::Equal, "==", 3, false);
        operators.register(OperatorKind::NotEqual, "!=", 3, false);
        operators.register(OperatorKind::And, "&&", 2, false);
        operators.register(OperatorKind::Or, "||", 1, false);
        operators.register(OperatorKind::Assign, "=", 0, false);
        operators.register(OperatorKind::AssignAdd, "+=", 0, true);
        operators.register(OperatorKind::AssignSubtract, "-=", 0, true);
        operators.register(OperatorKind::AssignMultiply, "*=", 0, true);
        operators.register(OperatorKind::AssignDivide, "/=", 0, true);
        operators.register(OperatorKind::Reference, "&", 0, false);
        operators.register(OperatorKind::Optional, "?", 0, false);
        operators
    }

    fn register(&mut self, kind: OperatorKind, symbol: &'static str, weight: u8, is_mutator: bool) {
        self.entries.push(Operator {
            kind,
            symbol,
            weight,
            is_mutator,
        });
    }

    pub fn get(&self, symbol: &str) -> Option<Operator> {
        self.entries.iter().find(|op| op.symbol == symbol).copied()
    }
}

impl Default for Operators {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let operators = Operators::new();
        let mul = operators.get("*").unwrap();
        let add = operators.get("+").unwrap();
        assert!(mul.weight > add.weight);
    }

    #[test]
    fn test_mutators_are_flagged() {
        let operators = Operators::new();
        assert!(operators.get("+=").unwrap().is_mutator);
        assert!(!operators.get("+").unwrap().is_mutator);
        assert_eq!(
            operators.get("+=").unwrap().kind.base(),
            Some(OperatorKind::Add)
        );
    }

    #[test]
    fn test_unknown_symbol() {
        assert_eq!(Operators::new().get("=-"), None);
    }
}
