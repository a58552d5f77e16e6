pub mod cursor;
pub mod error;
pub mod lexer;
pub mod resolver;
pub mod runtime;
pub mod symbols;
pub mod token;
