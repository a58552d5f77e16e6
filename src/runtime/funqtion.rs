use std::fmt::Display;
use std::rc::Rc;

use crate::cursor::Cursor;
use crate::error::SqrError;
use crate::runtime::qlass::Qlass;
use crate::runtime::qontext::QontextRef;
use crate::runtime::value::Value;
use crate::runtime::Runtime;
use crate::token::Token;

/// An unresolved token sequence. Bodies are re-resolved from their tokens on
/// every execution; nothing is cached between runs.
#[derive(Debug, Clone)]
pub struct Body {
    content: Rc<[Token]>,
}

impl Body {
    pub fn new(content: impl Into<Rc<[Token]>>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn cursor(&self) -> Cursor<Token> {
        Cursor::new(Rc::clone(&self.content))
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.content
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub declared_type: Option<Rc<Qlass>>,
    pub default: Option<Value>,
    pub optional: bool,
}

/// A user-defined funqtion. `closure` is only set for inline funqtions,
/// which capture the qontext they were written in; declared funqtions run
/// against the qontext of their call site chain.
#[derive(Clone)]
pub struct Funqtion {
    pub name: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Rc<Qlass>>,
    pub body: Body,
    pub closure: Option<QontextRef>,
}

impl std::fmt::Debug for Funqtion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Funqtion")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type.as_ref().map(|q| &q.name))
            .field("closure", &self.closure.is_some())
            .finish_non_exhaustive()
    }
}

pub type NativeFn =
    Rc<dyn Fn(&Runtime, &QontextRef, &[Value], Option<&Value>) -> Result<Value, SqrError>>;

#[derive(Clone)]
pub struct NativeFunqtion {
    pub name: &'static str,
    /// Checked before dispatch when present; variadic natives leave it unset.
    pub arity: Option<usize>,
    pub callback: NativeFn,
}

impl std::fmt::Debug for NativeFunqtion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunqtion")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Qallable {
    Funqtion(Funqtion),
    Native(NativeFunqtion),
}

impl Display for Qallable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Qallable::Funqtion(funqtion) => write!(
                f,
                "<funqtion {}({})>",
                funqtion.name.as_deref().unwrap_or("anonymous"),
                funqtion.parameters.len()
            ),
            Qallable::Native(native) => write!(f, "<native {}>", native.name),
        }
    }
}
