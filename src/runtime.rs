use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::debug;

use crate::cursor::Cursor;
use crate::error::{SqrError, TypeError};
use crate::lexer::Lexer;
use crate::resolver::Signal;
use crate::runtime::qlass::TypeRegistry;
use crate::runtime::qontext::{Module, Qontext, QontextRef};
use crate::runtime::value::Value;
use crate::symbols::Symbols;

pub mod executor;
pub mod funqtion;
pub mod natives;
pub mod qlass;
pub mod qontext;
pub mod value;
pub mod variable;

/// The interpreter context: grammar tables, the type registry, the root
/// qontext and the output sink. Built once per embedding; resolver and
/// executor methods hang off it so nothing reaches for globals.
pub struct Runtime {
    pub symbols: Symbols,
    pub types: TypeRegistry,
    root: QontextRef,
    module: Rc<RefCell<Module>>,
    stdout: Rc<RefCell<dyn Write>>,
}

impl Runtime {
    pub fn new(stdout: Rc<RefCell<dyn Write>>) -> Self {
        let module = Module::new("main");
        let root = Qontext::root(Rc::clone(&module));
        let runtime = Self {
            symbols: Symbols::new(),
            types: TypeRegistry::new(),
            root,
            module,
            stdout,
        };
        natives::install(&runtime);
        runtime
    }

    /// Runs a source text against the root qontext, interleaving resolution
    /// and execution one statement at a time. A top-level `return` ends the
    /// run with its value; otherwise the last statement's value is returned
    /// so an interactive host can echo it.
    pub fn run(&self, source: &str) -> Result<Value, SqrError> {
        let mut chars = Cursor::new(source.chars().collect::<Vec<_>>());
        let tokens = Lexer::new(&self.symbols).resolve(&mut chars)?;
        debug!("running {} tokens", tokens.len());

        let mut cursor = Cursor::new(tokens);
        let mut last = Value::Void;
        while !cursor.done() {
            let operation = self.resolve_one(&mut cursor, &self.root)?;
            let flow = self.execute_operation(&operation, &self.root)?;
            match flow.signal {
                Signal::None => last = flow.value,
                Signal::Return => return Ok(flow.value),
                signal => {
                    return Err(TypeError::SignalEscaped {
                        signal: signal.name(),
                    }
                    .into())
                }
            }
        }
        Ok(last)
    }

    pub fn root(&self) -> &QontextRef {
        &self.root
    }

    pub fn module(&self) -> &Rc<RefCell<Module>> {
        &self.module
    }

    pub(crate) fn print(&self, value: &Value) {
        let _ = writeln!(self.stdout.borrow_mut(), "{}", value);
    }
}
