//! Static grammar tables: keywords (with aliases), operators (with
//! precedence weights) and paired structure delimiters. Built once at
//! startup and threaded by reference into the lexer and resolver; nothing
//! here is mutable after construction.

pub mod keyword;
pub mod operator;
pub mod structure;

pub use keyword::{Keyword, KeywordKind, Keywords};
pub use operator::{Operator, OperatorKind, Operators};
pub use structure::{Structure, StructureKind, Structures};

#[derive(Debug)]
pub struct Symbols {
    pub keywords: Keywords,
    pub operators: Operators,
    pub structures: Structures,
}

impl Symbols {
    pub fn new() -> Self {
        Self {
            keywords: Keywords::new(),
            operators: Operators::new(),
            structures: Structures::new(),
        }
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Self::new()
    }
}
