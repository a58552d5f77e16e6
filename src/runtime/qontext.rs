use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{NameError, SqrError};
use crate::runtime::variable::Variable;

pub type QontextRef = Rc<RefCell<Qontext>>;

/// A lexical scope in the chain. Lookup walks toward the root; registration
/// is always local and rejects duplicates within the same qontext.
#[derive(Debug)]
pub struct Qontext {
    bindings: FxHashMap<String, Variable>,
    parent: Option<QontextRef>,
    /// Only the root qontext carries the module record.
    module: Option<Rc<RefCell<Module>>>,
}

impl Qontext {
    pub fn root(module: Rc<RefCell<Module>>) -> QontextRef {
        Rc::new(RefCell::new(Self {
            bindings: FxHashMap::default(),
            parent: None,
            module: Some(module),
        }))
    }

    pub fn child(parent: &QontextRef) -> QontextRef {
        Rc::new(RefCell::new(Self {
            bindings: FxHashMap::default(),
            parent: Some(Rc::clone(parent)),
            module: None,
        }))
    }

    pub fn lookup(&self, name: &str) -> Option<Variable> {
        self.bindings.get(name).cloned().or_else(|| {
            self.parent
                .as_ref()
                .and_then(|parent| parent.borrow().lookup(name))
        })
    }

    pub fn register(&mut self, name: &str, variable: Variable) -> Result<(), SqrError> {
        if self.bindings.contains_key(name) {
            return Err(NameError::Duplicate {
                name: name.to_string(),
            }
            .into());
        }
        self.bindings.insert(name.to_string(), variable);
        Ok(())
    }

    /// Unconditional binding, used by the host when installing natives and
    /// by call frames binding parameters. User declarations go through
    /// [`Qontext::register`] instead.
    pub fn insert(&mut self, name: &str, variable: Variable) {
        self.bindings.insert(name.to_string(), variable);
    }

    /// Records the binding in the module at the root of the chain.
    pub fn export(&self, name: &str, variable: Variable) {
        match (&self.module, &self.parent) {
            (Some(module), _) => {
                module.borrow_mut().exports.insert(name.to_string(), variable);
            }
            (None, Some(parent)) => parent.borrow().export(name, variable),
            (None, None) => {}
        }
    }
}

/// The export surface of one executed source unit.
#[derive(Debug, Default)]
pub struct Module {
    pub name: String,
    pub exports: FxHashMap<String, Variable>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            name: name.into(),
            exports: FxHashMap::default(),
        }))
    }
}
