use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{NameError, SqrError};
use crate::runtime::funqtion::{Body, Funqtion, Qallable};
use crate::runtime::value::Value;

/// A type. Native qlasses describe the built-in value shapes; user qlasses
/// additionally carry field and method declarations used when spawning.
#[derive(Debug)]
pub struct Qlass {
    pub name: String,
    pub native: bool,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<(String, Funqtion)>,
    pub statics: Vec<(String, Rc<Qallable>)>,
}

/// A field as written in the qlass body. The initializer stays unresolved
/// and is evaluated per spawn, so each instance gets a fresh value.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub type_name: Option<String>,
    pub readonly: bool,
    pub init: Option<Body>,
}

impl Qlass {
    pub fn native(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native: true,
            fields: Vec::new(),
            methods: Vec::new(),
            statics: Vec::new(),
        }
    }

    /// Whether `value` can live in a slot declared with this qlass.
    pub fn accepts(&self, value: &Value) -> bool {
        if self.native {
            return value.type_name() == self.name;
        }
        match value {
            Value::Objeqt(objeqt) => objeqt.borrow().of.as_deref() == Some(self.name.as_str()),
            _ => false,
        }
    }

    pub fn static_member(&self, name: &str) -> Option<Value> {
        self.statics
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, qallable)| Value::Qallable(Rc::clone(qallable)))
    }
}

/// All qlasses known by name. Seeded with the native shapes; user qlasses
/// join as their declarations resolve.
#[derive(Debug)]
pub struct TypeRegistry {
    entries: RefCell<FxHashMap<String, Rc<Qlass>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let registry = Self {
            entries: RefCell::new(FxHashMap::default()),
        };
        for name in ["Void", "Boolean", "Number", "String", "Qollection", "Objeqt"] {
            registry
                .entries
                .borrow_mut()
                .insert(name.to_string(), Rc::new(Qlass::native(name)));
        }
        registry
    }

    pub fn register(&self, qlass: Rc<Qlass>) -> Result<(), SqrError> {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(&qlass.name) {
            return Err(NameError::Duplicate {
                name: qlass.name.clone(),
            }
            .into());
        }
        entries.insert(qlass.name.clone(), qlass);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Rc<Qlass>> {
        self.entries.borrow().get(name).cloned()
    }

    pub fn resolve(&self, name: &str) -> Result<Rc<Qlass>, SqrError> {
        self.get(name).ok_or_else(|| {
            NameError::UnknownType {
                name: name.to_string(),
            }
            .into()
        })
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_native_acceptance() {
        let registry = TypeRegistry::new();
        let number = registry.resolve("Number").unwrap();
        assert!(number.accepts(&Value::Number(1.0)));
        assert!(!number.accepts(&Value::String("1".to_string())));
    }

    #[test]
    fn test_unknown_type() {
        assert!(matches!(
            TypeRegistry::new().resolve("Missing"),
            Err(SqrError::Name(NameError::UnknownType { .. }))
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = TypeRegistry::new();
        registry.register(Rc::new(Qlass::native("Point"))).unwrap();
        assert!(registry.register(Rc::new(Qlass::native("Point"))).is_err());
    }

    #[test]
    fn test_user_qlass_accepts_its_instances() {
        use crate::runtime::value::Objeqt;
        let point = Qlass {
            name: "Point".to_string(),
            native: false,
            fields: Vec::new(),
            methods: Vec::new(),
            statics: Vec::new(),
        };
        let mut instance = Objeqt::new();
        instance.of = Some("Point".to_string());
        assert!(point.accepts(&Value::objeqt(instance)));
        assert!(!point.accepts(&Value::objeqt(Objeqt::new())));
    }
}
