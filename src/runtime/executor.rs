//! Tree-walking execution. Operations evaluate left operand, operator,
//! right operand, in that fixed order; control-flow signals travel back as
//! [`Flow`] values, never as unwinding.

use std::rc::Rc;

use tracing::trace;

use crate::error::{NameError, SqrError, TypeError};
use crate::resolver::{Flow, Node, Operand, Operation, Qondition, Signal};
use crate::runtime::funqtion::{Body, Funqtion, Qallable};
use crate::runtime::natives;
use crate::runtime::qlass::Qlass;
use crate::runtime::qontext::{Qontext, QontextRef};
use crate::runtime::value::{Objeqt, Qollection, Value};
use crate::runtime::variable::Variable;
use crate::runtime::Runtime;
use crate::symbols::{Operator, OperatorKind};

/// An assignable location: a named variable or a member slot of a
/// composite value.
enum Place {
    Variable(Variable),
    Member { target: Value, key: Value },
}

impl Runtime {
    pub fn execute_operation(
        &self,
        operation: &Operation,
        qontext: &QontextRef,
    ) -> Result<Flow, SqrError> {
        if let Some(Operand::Qondition(qondition)) = &operation.tree.left {
            return self.execute_qondition(qondition, qontext);
        }
        let value = self.execute_node(&operation.tree, qontext)?;
        Ok(Flow::signal(
            value,
            operation.signal,
            operation.target.clone(),
        ))
    }

    /// Resolve-one/execute-one over a body's tokens, stopping early on any
    /// non-plain flow. Remaining statements are not even resolved.
    pub fn execute_body(&self, body: &Body, qontext: &QontextRef) -> Result<Flow, SqrError> {
        let mut cursor = body.cursor();
        while !cursor.done() {
            let operation = self.resolve_one(&mut cursor, qontext)?;
            let flow = self.execute_operation(&operation, qontext)?;
            if !flow.is_plain() {
                return Ok(flow);
            }
        }
        Ok(Flow::value(Value::Void))
    }

    pub(crate) fn execute_node(
        &self,
        node: &Node,
        qontext: &QontextRef,
    ) -> Result<Value, SqrError> {
        trace!("executing node {:?}", node);
        let Some(op) = node.op else {
            let Some(left) = &node.left else {
                return Ok(Value::Void);
            };
            let mut value = self.evaluate_operand(left, qontext)?;
            if let Some(arguments) = &node.data {
                value = self.call(value, arguments, qontext, None)?;
            }
            if let Some(modifier) = node.left_mod {
                value = apply_unary(modifier, value)?;
            }
            return Ok(value);
        };

        if op.kind == OperatorKind::Accessor {
            return self.execute_access(node, qontext);
        }
        if op.kind == OperatorKind::Assign || op.is_mutator {
            return self.execute_assignment(node, op, qontext);
        }

        let mut left = self.evaluate_operand(required(&node.left)?, qontext)?;
        if let Some(arguments) = &node.data {
            left = self.call(left, arguments, qontext, None)?;
        }
        if let Some(modifier) = node.left_mod {
            left = apply_unary(modifier, left)?;
        }

        // Logical operators short-circuit before the right side runs.
        match op.kind {
            OperatorKind::And if !left.is_truthy() => return Ok(Value::Boolean(false)),
            OperatorKind::Or if left.is_truthy() => return Ok(Value::Boolean(true)),
            _ => {}
        }

        let mut right = self.evaluate_operand(required(&node.right)?, qontext)?;
        if let Some(modifier) = node.right_mod {
            right = apply_unary(modifier, right)?;
        }
        apply_binary(op.kind, op.symbol, left, right)
    }

    fn evaluate_operand(&self, operand: &Operand, qontext: &QontextRef) -> Result<Value, SqrError> {
        match operand {
            Operand::Value(value) => Ok(value.clone()),
            Operand::Variable(variable) => Ok(variable.get()),
            Operand::Sub(node) => self.execute_node(node, qontext),
            Operand::Qondition(qondition) => {
                let flow = self.execute_qondition(qondition, qontext)?;
                if flow.is_plain() {
                    Ok(flow.value)
                } else {
                    Err(TypeError::SignalEscaped {
                        signal: flow.signal.name(),
                    }
                    .into())
                }
            }
        }
    }

    /// `target:member` reads; with attached arguments it is a method call
    /// with the target bound as `self`.
    fn execute_access(&self, node: &Node, qontext: &QontextRef) -> Result<Value, SqrError> {
        let target = self.evaluate_operand(required(&node.left)?, qontext)?;
        let mut key = self.evaluate_operand(required(&node.right)?, qontext)?;
        if let Some(modifier) = node.right_mod {
            key = apply_unary(modifier, key)?;
        }
        let member = self.access_member(&target, &key)?;
        let mut value = match &node.data {
            Some(arguments) => self.call(member, arguments, qontext, Some(&target))?,
            None => member,
        };
        if let Some(modifier) = node.left_mod {
            value = apply_unary(modifier, value)?;
        }
        Ok(value)
    }

    fn access_member(&self, target: &Value, key: &Value) -> Result<Value, SqrError> {
        match (target, key) {
            (Value::Qollection(qollection), Value::Number(index)) => {
                Ok(qollection.borrow().slot(*index)?.get())
            }
            (Value::Objeqt(objeqt), Value::String(member)) => {
                if let Some(variable) = objeqt.borrow().get(member) {
                    return Ok(variable.get());
                }
                // Absent keys read as Void, native members aside.
                Ok(natives::member(target, member).unwrap_or(Value::Void))
            }
            (Value::Qlass(qlass), Value::String(member)) => {
                qlass
                    .static_member(member)
                    .ok_or_else(|| {
                        NameError::UnknownMember {
                            name: qlass.name.clone(),
                            member: member.clone(),
                        }
                        .into()
                    })
            }
            (_, Value::String(member)) => {
                natives::member(target, member).ok_or_else(|| {
                    NameError::UnknownMember {
                        name: target.type_name().to_string(),
                        member: member.clone(),
                    }
                    .into()
                })
            }
            _ => Err(TypeError::NotIndexable {
                found: target.type_name(),
            }
            .into()),
        }
    }

    fn execute_assignment(
        &self,
        node: &Node,
        op: Operator,
        qontext: &QontextRef,
    ) -> Result<Value, SqrError> {
        let place = self.place_of(required(&node.left)?, qontext)?;
        let mut value = self.evaluate_operand(required(&node.right)?, qontext)?;
        if let Some(modifier) = node.right_mod {
            value = apply_unary(modifier, value)?;
        }

        if let Some(base) = op.kind.base() {
            let current = match &place {
                Place::Variable(variable) => variable.get(),
                Place::Member { target, key } => self.access_member(target, key)?,
            };
            value = apply_binary(base, op.symbol, current, value)?;
        }

        match &place {
            Place::Variable(variable) => variable.set(value.clone())?,
            Place::Member { target, key } => assign_member(target, key, value.clone())?,
        }
        Ok(value)
    }

    fn place_of(&self, operand: &Operand, qontext: &QontextRef) -> Result<Place, SqrError> {
        match operand {
            Operand::Variable(variable) => Ok(Place::Variable(variable.clone())),
            Operand::Sub(node)
                if node.op.is_some_and(|op| op.kind == OperatorKind::Accessor)
                    && node.data.is_none() =>
            {
                let target = self.evaluate_operand(required(&node.left)?, qontext)?;
                let mut key = self.evaluate_operand(required(&node.right)?, qontext)?;
                if let Some(modifier) = node.right_mod {
                    key = apply_unary(modifier, key)?;
                }
                Ok(Place::Member { target, key })
            }
            Operand::Value(value) => Err(TypeError::NotAssignable {
                found: value.type_name(),
            }
            .into()),
            _ => Err(TypeError::NotAssignable { found: "operation" }.into()),
        }
    }

    pub(crate) fn call(
        &self,
        callee: Value,
        arguments: &[Value],
        qontext: &QontextRef,
        self_value: Option<&Value>,
    ) -> Result<Value, SqrError> {
        match &callee {
            Value::Qallable(qallable) => match qallable.as_ref() {
                Qallable::Native(native) => {
                    if let Some(arity) = native.arity {
                        if arguments.len() < arity {
                            return Err(TypeError::MissingParameter {
                                name: native.name.to_string(),
                            }
                            .into());
                        }
                    }
                    (native.callback)(self, qontext, arguments, self_value)
                }
                Qallable::Funqtion(funqtion) => {
                    self.call_funqtion(funqtion, arguments, qontext, self_value)
                }
            },
            other => Err(TypeError::NotCallable {
                found: other.type_name(),
            }
            .into()),
        }
    }

    /// Positional parameter binding into a fresh frame; a captured Return
    /// unwraps to a plain value, a Break/Continue reaching the funqtion
    /// boundary is an error.
    pub(crate) fn call_funqtion(
        &self,
        funqtion: &Funqtion,
        arguments: &[Value],
        caller: &QontextRef,
        self_value: Option<&Value>,
    ) -> Result<Value, SqrError> {
        let base = funqtion.closure.as_ref().unwrap_or(caller);
        let frame = Qontext::child(base);

        for (index, parameter) in funqtion.parameters.iter().enumerate() {
            let value = match arguments.get(index) {
                Some(value) => value.clone(),
                None if parameter.optional => {
                    parameter.default.clone().unwrap_or(Value::Void)
                }
                None => {
                    return Err(TypeError::MissingParameter {
                        name: parameter.name.clone(),
                    }
                    .into())
                }
            };
            let variable =
                Variable::typed(Value::Void, parameter.declared_type.clone(), false);
            variable.set(value)?;
            frame.borrow_mut().insert(&parameter.name, variable);
        }
        if let Some(value) = self_value {
            frame.borrow_mut().insert("self", Variable::new(value.clone()));
        }

        let flow = self.execute_body(&funqtion.body, &frame)?;
        match flow.signal {
            Signal::None => Ok(Value::Void),
            Signal::Return => {
                if let Some(return_type) = &funqtion.return_type {
                    if !matches!(flow.value, Value::Void) && !return_type.accepts(&flow.value) {
                        return Err(TypeError::WrongType {
                            expected: return_type.name.clone(),
                            found: flow.value.type_name(),
                        }
                        .into());
                    }
                }
                Ok(flow.value)
            }
            signal => Err(TypeError::SignalEscaped {
                signal: signal.name(),
            }
            .into()),
        }
    }

    /// Builds an instance of a user qlass: fields first (initializers run
    /// fresh per spawn), then bound methods, then the `init` constructor.
    pub(crate) fn spawn(
        &self,
        qlass: &Rc<Qlass>,
        arguments: Vec<Value>,
        qontext: &QontextRef,
    ) -> Result<Value, SqrError> {
        if qlass.native {
            return match qlass.name.as_str() {
                "Qollection" => Ok(Value::qollection(Qollection::from_values(arguments))),
                "Objeqt" => Ok(Value::objeqt(Objeqt::new())),
                _ => Err(TypeError::NotSpawnable {
                    name: qlass.name.clone(),
                }
                .into()),
            };
        }

        let mut instance = Objeqt::new();
        instance.of = Some(qlass.name.clone());
        for field in &qlass.fields {
            let declared_type = match &field.type_name {
                Some(type_name) => Some(self.types.resolve(type_name)?),
                None => None,
            };
            let variable = Variable::typed(Value::Void, declared_type, field.readonly);
            if let Some(init) = &field.init {
                let value = self.evaluate_tokens(init.tokens().to_vec(), qontext)?;
                variable.set(value)?;
            }
            instance.insert(field.name.clone(), variable);
        }
        for (name, funqtion) in &qlass.methods {
            let value = Value::Qallable(Rc::new(Qallable::Funqtion(funqtion.clone())));
            instance.insert(name.clone(), Variable::new(value));
        }

        let value = Value::objeqt(instance);
        if let Some((_, init)) = qlass.methods.iter().find(|(name, _)| name == "init") {
            self.call_funqtion(init, &arguments, qontext, Some(&value))?;
        }
        Ok(value)
    }

    fn execute_qondition(
        &self,
        qondition: &Qondition,
        qontext: &QontextRef,
    ) -> Result<Flow, SqrError> {
        match qondition {
            Qondition::If { branches, fallback } => {
                for (condition, body) in branches {
                    if self.evaluate_condition(condition, qontext)? {
                        return self.execute_body(body, &Qontext::child(qontext));
                    }
                }
                match fallback {
                    Some(body) => self.execute_body(body, &Qontext::child(qontext)),
                    None => Ok(Flow::value(Value::Void)),
                }
            }
            Qondition::While {
                label,
                condition,
                body,
            } => {
                while self.evaluate_condition(condition, qontext)? {
                    let flow = self.execute_body(body, &Qontext::child(qontext))?;
                    if let Some(flow) = route_loop_flow(flow, label) {
                        return Ok(flow);
                    }
                }
                Ok(Flow::value(Value::Void))
            }
            Qondition::DoWhile {
                label,
                condition,
                body,
            } => {
                loop {
                    let flow = self.execute_body(body, &Qontext::child(qontext))?;
                    if let Some(flow) = route_loop_flow(flow, label) {
                        return Ok(flow);
                    }
                    if !self.evaluate_condition(condition, qontext)? {
                        break;
                    }
                }
                Ok(Flow::value(Value::Void))
            }
            Qondition::For {
                label,
                init,
                condition,
                step,
                body,
            } => {
                // The header gets its own qontext so the loop variable
                // survives across iterations without leaking outward.
                let header = Qontext::child(qontext);
                self.execute_body(init, &header)?;
                while self.evaluate_condition(condition, &header)? {
                    let flow = self.execute_body(body, &Qontext::child(&header))?;
                    if let Some(flow) = route_loop_flow(flow, label) {
                        return Ok(flow);
                    }
                    self.execute_body(step, &header)?;
                }
                Ok(Flow::value(Value::Void))
            }
        }
    }

    fn evaluate_condition(&self, body: &Body, qontext: &QontextRef) -> Result<bool, SqrError> {
        if body.is_empty() {
            // An empty `for` condition runs forever, like the original's.
            return Ok(true);
        }
        let value = self.evaluate_tokens(body.tokens().to_vec(), qontext)?;
        Ok(value.is_truthy())
    }
}

/// Decides whether a loop iteration's flow ends the loop (`Some` returns
/// from the qondition), continues it (`None`), or propagates outward.
fn route_loop_flow(flow: Flow, label: &Option<String>) -> Option<Flow> {
    let targets_this_loop =
        flow.target.is_none() || flow.target.as_deref() == label.as_deref();
    match flow.signal {
        Signal::None => None,
        Signal::Return => Some(flow),
        Signal::Break if targets_this_loop => Some(Flow::value(Value::Void)),
        Signal::Continue if targets_this_loop => None,
        // A labeled signal for an outer loop keeps traveling.
        _ => Some(flow),
    }
}

fn required(operand: &Option<Operand>) -> Result<&Operand, SqrError> {
    operand.as_ref().ok_or(SqrError::EndOfInput)
}

fn apply_unary(op: Operator, value: Value) -> Result<Value, SqrError> {
    match (op.kind, &value) {
        (OperatorKind::Not, _) => Ok(Value::Boolean(!value.is_truthy())),
        (OperatorKind::Subtract, Value::Number(n)) => Ok(Value::Number(-n)),
        (OperatorKind::Add, Value::Number(n)) => Ok(Value::Number(*n)),
        _ => Err(TypeError::InvalidUnary {
            op: op.symbol,
            operand: value.type_name(),
        }
        .into()),
    }
}

fn apply_binary(
    kind: OperatorKind,
    symbol: &'static str,
    left: Value,
    right: Value,
) -> Result<Value, SqrError> {
    let invalid = |left: &Value, right: &Value| {
        SqrError::from(TypeError::InvalidOperands {
            op: symbol,
            left: left.type_name(),
            right: right.type_name(),
        })
    };
    match kind {
        OperatorKind::Add => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(_), _) | (_, Value::String(_)) => {
                Ok(Value::String(format!("{}{}", left, right)))
            }
            _ => Err(invalid(&left, &right)),
        },
        OperatorKind::Subtract => numeric(kind, &left, &right, invalid),
        OperatorKind::Multiply => numeric(kind, &left, &right, invalid),
        OperatorKind::Divide => numeric(kind, &left, &right, invalid),
        OperatorKind::Modulo => numeric(kind, &left, &right, invalid),
        OperatorKind::Less
        | OperatorKind::LessEqual
        | OperatorKind::Greater
        | OperatorKind::GreaterEqual => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(compare(kind, a, b))),
            (Value::String(a), Value::String(b)) => Ok(Value::Boolean(compare(kind, a, b))),
            _ => Err(invalid(&left, &right)),
        },
        OperatorKind::Equal => Ok(Value::Boolean(left == right)),
        OperatorKind::NotEqual => Ok(Value::Boolean(left != right)),
        OperatorKind::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
        OperatorKind::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
        _ => Err(invalid(&left, &right)),
    }
}

fn numeric(
    kind: OperatorKind,
    left: &Value,
    right: &Value,
    invalid: impl Fn(&Value, &Value) -> SqrError,
) -> Result<Value, SqrError> {
    let (Value::Number(a), Value::Number(b)) = (left, right) else {
        return Err(invalid(left, right));
    };
    let result = match kind {
        OperatorKind::Subtract => a - b,
        OperatorKind::Multiply => a * b,
        OperatorKind::Divide => a / b,
        OperatorKind::Modulo => a % b,
        _ => return Err(invalid(left, right)),
    };
    Ok(Value::Number(result))
}

fn compare<T: PartialOrd>(kind: OperatorKind, a: &T, b: &T) -> bool {
    match kind {
        OperatorKind::Less => a < b,
        OperatorKind::LessEqual => a <= b,
        OperatorKind::Greater => a > b,
        OperatorKind::GreaterEqual => a >= b,
        _ => false,
    }
}

fn assign_member(target: &Value, key: &Value, value: Value) -> Result<(), SqrError> {
    match (target, key) {
        (Value::Objeqt(objeqt), Value::String(member)) => {
            let variable = objeqt.borrow_mut().ensure(member);
            variable.set(value)
        }
        (Value::Qollection(qollection), Value::Number(index)) => {
            let slot = qollection.borrow().slot(*index)?;
            slot.set(value)
        }
        _ => Err(TypeError::NotAssignable {
            found: target.type_name(),
        }
        .into()),
    }
}
