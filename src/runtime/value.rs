use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use crate::error::{SqrError, TypeError};
use crate::runtime::funqtion::Qallable;
use crate::runtime::qlass::Qlass;
use crate::runtime::variable::Variable;

/// The runtime object model. Composite values share their storage: cloning
/// a `Value` never deep-copies a qollection or objeqt.
#[derive(Debug, Clone)]
pub enum Value {
    Void,
    Boolean(bool),
    Number(f64),
    String(String),
    Qollection(Rc<RefCell<Qollection>>),
    Objeqt(Rc<RefCell<Objeqt>>),
    Qallable(Rc<Qallable>),
    Qlass(Rc<Qlass>),
}

impl Value {
    pub fn qollection(qollection: Qollection) -> Self {
        Value::Qollection(Rc::new(RefCell::new(qollection)))
    }

    pub fn objeqt(objeqt: Objeqt) -> Self {
        Value::Objeqt(Rc::new(RefCell::new(objeqt)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "Void",
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Qollection(_) => "Qollection",
            Value::Objeqt(_) => "Objeqt",
            Value::Qallable(_) => "Funqtion",
            Value::Qlass(_) => "Qlass",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Void => false,
            Value::Boolean(b) => *b,
            _ => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Qollection(a), Value::Qollection(b)) => Rc::ptr_eq(a, b),
            (Value::Objeqt(a), Value::Objeqt(b)) => Rc::ptr_eq(a, b),
            (Value::Qallable(a), Value::Qallable(b)) => Rc::ptr_eq(a, b),
            (Value::Qlass(a), Value::Qlass(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Void => write!(f, "void"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Qollection(q) => {
                write!(f, "[")?;
                for (index, item) in q.borrow().items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.get())?;
                }
                write!(f, "]")
            }
            Value::Objeqt(o) => {
                write!(f, "{{ ")?;
                for (index, (key, variable)) in o.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, variable.get())?;
                }
                write!(f, " }}")
            }
            Value::Qallable(q) => write!(f, "{}", q),
            Value::Qlass(q) => write!(f, "<qlass {}>", q.name),
        }
    }
}

/// Ordered, index-addressable sequence of variables. Indexed access is
/// bounds-checked and never auto-extends.
#[derive(Debug, Default)]
pub struct Qollection {
    pub items: Vec<Variable>,
}

impl Qollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            items: values.into_iter().map(Variable::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn values(&self) -> Vec<Value> {
        self.items.iter().map(Variable::get).collect()
    }

    pub fn push(&mut self, value: Value) {
        self.items.push(Variable::new(value));
    }

    /// The storage slot at `index`; fails for anything that is not an
    /// integer inside the qollection's boundaries.
    pub fn slot(&self, index: f64) -> Result<Variable, SqrError> {
        let out_of_bounds = || {
            SqrError::from(TypeError::IndexOutOfBounds {
                index,
                length: self.items.len(),
            })
        };
        if index < 0.0 || index.fract() != 0.0 {
            return Err(out_of_bounds());
        }
        self.items
            .get(index as usize)
            .cloned()
            .ok_or_else(out_of_bounds)
    }
}

/// Free-form, insertion-ordered record value. Reading an absent key yields
/// Void; writing an absent key creates the slot.
#[derive(Debug, Default)]
pub struct Objeqt {
    /// Set when this objeqt was spawned from a qlass.
    pub of: Option<String>,
    entries: Vec<(String, Variable)>,
}

impl Objeqt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Variable> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, variable)| variable.clone())
    }

    /// The slot for `key`, created on first write.
    pub fn ensure(&mut self, key: &str) -> Variable {
        if let Some(variable) = self.get(key) {
            return variable;
        }
        let variable = Variable::new(Value::Void);
        self.entries.push((key.to_string(), variable.clone()));
        variable
    }

    pub fn insert(&mut self, key: impl Into<String>, variable: Variable) {
        self.entries.push((key.into(), variable));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Variable)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_qollection_bounds() {
        let qollection = Qollection::from_values([
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
        ]);
        assert!(qollection.slot(2.0).is_ok());
        assert!(qollection.slot(3.0).is_err());
        assert!(qollection.slot(-1.0).is_err());
        assert!(qollection.slot(0.5).is_err());
    }

    #[test]
    fn test_objeqt_preserves_insertion_order() {
        let mut objeqt = Objeqt::new();
        objeqt.ensure("b").set(Value::Number(1.0)).unwrap();
        objeqt.ensure("a").set(Value::Number(2.0)).unwrap();
        let keys: Vec<&str> = objeqt.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_objeqt_absent_key() {
        let objeqt = Objeqt::new();
        assert!(objeqt.get("missing").is_none());
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Number(2.0), Value::Number(2.0));
        assert_ne!(Value::Number(2.0), Value::String("2".to_string()));
        let a = Value::qollection(Qollection::new());
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Value::qollection(Qollection::new()));
    }
}
