//! Error taxonomy for the whole pipeline. `EndOfInput` is a structural
//! sentinel consumed by driving loops; every other kind unwinds to the host
//! carrying enough position data to point at the offending source.

#[derive(Debug, thiserror::Error)]
pub enum SqrError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("unexpected end of input")]
    EndOfInput,
}

#[derive(Debug, thiserror::Error)]
pub enum LexicalError {
    #[error("string without end at {row}:{col}, content so far: \"{content}\"")]
    UnterminatedString {
        content: String,
        row: usize,
        col: usize,
    },
    #[error("cannot read \"{raw}\" as {class} at {row}:{col}")]
    MalformedLiteral {
        raw: String,
        class: &'static str,
        row: usize,
        col: usize,
    },
    #[error("unknown symbol \"{raw}\" at {row}:{col}")]
    UnknownSymbol {
        raw: String,
        row: usize,
        col: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unknown or entirely unexpected token \"{raw}\" at {row}:{col}")]
    UnexpectedToken {
        raw: String,
        row: usize,
        col: usize,
    },
    #[error("unexpected value \"{raw}\" after full operation node at {row}:{col}")]
    UnexpectedValue {
        raw: String,
        row: usize,
        col: usize,
    },
    #[error("operator \"{symbol}\" does not fit this operation at {row}:{col}")]
    UnexpectedOperator {
        symbol: String,
        row: usize,
        col: usize,
    },
    #[error("keyword \"{raw}\" is only legal at the start of a statement ({row}:{col})")]
    UnexpectedKeyword {
        raw: String,
        row: usize,
        col: usize,
    },
    #[error("unexpected structure symbol \"{raw}\" at {row}:{col}; an opening symbol is expected")]
    UnexpectedStructure {
        raw: String,
        row: usize,
        col: usize,
    },
    #[error("structure opened with '{open}' at {row}:{col} is never closed")]
    UnclosedStructure {
        open: char,
        row: usize,
        col: usize,
    },
    #[error("expected an identifier at {row}:{col}, found \"{raw}\"")]
    ExpectedIdentifier {
        raw: String,
        row: usize,
        col: usize,
    },
    #[error("operation node at {row}:{col} holds two operands but no operator")]
    MissingOperator { row: usize, col: usize },
    #[error("operator at {row}:{col} ends its statement without a right operand")]
    MissingOperand { row: usize, col: usize },
    #[error("required parameter \"{name}\" follows an optional one")]
    RequiredParameterAfterOptional { name: String },
    #[error("reference declaration \"{name}\" needs an initializing identifier (var& {name} = other)")]
    ReferenceWithoutTarget { name: String },
    #[error("keyword \"{symbol}\" is reserved and not available here")]
    ReservedKeyword { symbol: String },
    #[error("objeqt literal entry at {row}:{col} must look like `key: value`")]
    MalformedEntry { row: usize, col: usize },
    #[error("for header at {row}:{col} must hold `init; qondition; step`")]
    MalformedForHeader { row: usize, col: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum NameError {
    #[error("unresolved identifier \"{name}\" at {row}:{col}")]
    Unresolved {
        name: String,
        row: usize,
        col: usize,
    },
    #[error("\"{name}\" is already declared in this qontext")]
    Duplicate { name: String },
    #[error("unknown type \"{name}\"")]
    UnknownType { name: String },
    #[error("\"{name}\" has no member \"{member}\"")]
    UnknownMember { name: String, member: String },
    #[error("assignment to readonly variable")]
    Readonly,
}

#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    #[error("index {index} outside of qollection's boundaries (length {length})")]
    IndexOutOfBounds { index: f64, length: usize },
    #[error("{found} cannot be accessed by index or member")]
    NotIndexable { found: &'static str },
    #[error("{found} is not callable")]
    NotCallable { found: &'static str },
    #[error("{found} cannot be assigned to")]
    NotAssignable { found: &'static str },
    #[error("parameter \"{name}\" missing")]
    MissingParameter { name: String },
    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: String,
        found: &'static str,
    },
    #[error("invalid operation: {left} {op} {right}")]
    InvalidOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("invalid unary operation: {op}{operand}")]
    InvalidUnary {
        op: &'static str,
        operand: &'static str,
    },
    #[error("{signal} signal escaped the enclosing funqtion")]
    SignalEscaped { signal: &'static str },
    #[error("type \"{name}\" cannot be spawned")]
    NotSpawnable { name: String },
}
