use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{NameError, SqrError, TypeError};
use crate::runtime::qlass::Qlass;
use crate::runtime::value::Value;

/// A named storage cell. The cell itself is shared: a reference declaration
/// produces a second `Variable` over the same cell, so writes through either
/// name are visible through both.
#[derive(Debug, Clone)]
pub struct Variable {
    cell: Rc<RefCell<Value>>,
    pub declared_type: Option<Rc<Qlass>>,
    pub is_readonly: bool,
    pub is_reference: bool,
}

impl Variable {
    pub fn new(value: Value) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
            declared_type: None,
            is_readonly: false,
            is_reference: false,
        }
    }

    pub fn typed(value: Value, declared_type: Option<Rc<Qlass>>, is_readonly: bool) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value)),
            declared_type,
            is_readonly,
            is_reference: false,
        }
    }

    /// A second name over the same cell.
    pub fn alias(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            declared_type: self.declared_type.clone(),
            is_readonly: self.is_readonly,
            is_reference: true,
        }
    }

    pub fn get(&self) -> Value {
        self.cell.borrow().clone()
    }

    /// A readonly variable accepts exactly one write, into a still-void
    /// cell; a typed variable only accepts values its qlass admits.
    pub fn set(&self, value: Value) -> Result<(), SqrError> {
        if self.is_readonly && !matches!(*self.cell.borrow(), Value::Void) {
            return Err(NameError::Readonly.into());
        }
        if let Some(qlass) = &self.declared_type {
            if !matches!(value, Value::Void) && !qlass.accepts(&value) {
                return Err(TypeError::WrongType {
                    expected: qlass.name.clone(),
                    found: value.type_name(),
                }
                .into());
            }
        }
        *self.cell.borrow_mut() = value;
        Ok(())
    }

    pub fn shares_cell(&self, other: &Variable) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_alias_shares_storage() {
        let original = Variable::new(Value::Number(1.0));
        let alias = original.alias();
        alias.set(Value::Number(5.0)).unwrap();
        assert_eq!(original.get(), Value::Number(5.0));
        assert!(alias.is_reference);
        assert!(original.shares_cell(&alias));
    }

    #[test]
    fn test_readonly_allows_one_write() {
        let constant = Variable::typed(Value::Void, None, true);
        constant.set(Value::Number(3.0)).unwrap();
        assert!(matches!(
            constant.set(Value::Number(4.0)),
            Err(SqrError::Name(NameError::Readonly))
        ));
    }

    #[test]
    fn test_typed_variable_rejects_mismatch() {
        let qlass = Rc::new(Qlass::native("Number"));
        let variable = Variable::typed(Value::Void, Some(qlass), false);
        variable.set(Value::Number(1.0)).unwrap();
        assert!(matches!(
            variable.set(Value::String("nope".to_string())),
            Err(SqrError::Type(TypeError::WrongType { .. }))
        ));
    }
}
