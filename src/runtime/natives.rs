//! Built-in funqtions and native members. Globals land in the root
//! qontext; collection members are built on demand as bound natives
//! capturing their target.

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{SqrError, TypeError};
use crate::runtime::funqtion::{NativeFunqtion, Qallable};
use crate::runtime::qlass::Qlass;
use crate::runtime::qontext::QontextRef;
use crate::runtime::value::Value;
use crate::runtime::variable::Variable;
use crate::runtime::Runtime;

type Callback =
    dyn Fn(&Runtime, &QontextRef, &[Value], Option<&Value>) -> Result<Value, SqrError>;

fn qallable(
    name: &'static str,
    arity: Option<usize>,
    callback: impl Fn(&Runtime, &QontextRef, &[Value], Option<&Value>) -> Result<Value, SqrError>
        + 'static,
) -> Rc<Qallable> {
    let callback: Rc<Callback> = Rc::new(callback);
    Rc::new(Qallable::Native(NativeFunqtion {
        name,
        arity,
        callback,
    }))
}

fn value(
    name: &'static str,
    arity: Option<usize>,
    callback: impl Fn(&Runtime, &QontextRef, &[Value], Option<&Value>) -> Result<Value, SqrError>
        + 'static,
) -> Value {
    Value::Qallable(qallable(name, arity, callback))
}

fn number_arg(args: &[Value], index: usize, name: &'static str) -> Result<f64, SqrError> {
    match args.get(index) {
        Some(Value::Number(n)) => Ok(*n),
        Some(other) => Err(TypeError::WrongType {
            expected: "Number".to_string(),
            found: other.type_name(),
        }
        .into()),
        None => Err(TypeError::MissingParameter {
            name: name.to_string(),
        }
        .into()),
    }
}

pub(crate) fn install(runtime: &Runtime) {
    let mut root = runtime.root().borrow_mut();

    root.insert(
        "print",
        Variable::new(value("print", Some(1), |rt, _, args, _| {
            rt.print(args.first().unwrap_or(&Value::Void));
            Ok(Value::Void)
        })),
    );
    root.insert(
        "clock",
        Variable::new(value("clock", Some(0), |_, _, _, _| {
            let elapsed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            Ok(Value::Number(elapsed.as_secs_f64()))
        })),
    );

    let calc = Rc::new(Qlass {
        name: "Calc".to_string(),
        native: true,
        fields: Vec::new(),
        methods: Vec::new(),
        statics: vec![
            (
                "round".to_string(),
                qallable("round", Some(1), |_, _, args, _| {
                    Ok(Value::Number(number_arg(args, 0, "value")?.round()))
                }),
            ),
            (
                "sqrt".to_string(),
                qallable("sqrt", Some(1), |_, _, args, _| {
                    Ok(Value::Number(number_arg(args, 0, "value")?.sqrt()))
                }),
            ),
            (
                "abs".to_string(),
                qallable("abs", Some(1), |_, _, args, _| {
                    Ok(Value::Number(number_arg(args, 0, "value")?.abs()))
                }),
            ),
            (
                "pow".to_string(),
                qallable("pow", Some(2), |_, _, args, _| {
                    let base = number_arg(args, 0, "base")?;
                    let exponent = number_arg(args, 1, "exponent")?;
                    Ok(Value::Number(base.powf(exponent)))
                }),
            ),
            (
                "log".to_string(),
                qallable("log", Some(1), |_, _, args, _| {
                    Ok(Value::Number(number_arg(args, 0, "value")?.ln()))
                }),
            ),
            (
                "log2".to_string(),
                qallable("log2", Some(1), |_, _, args, _| {
                    Ok(Value::Number(number_arg(args, 0, "value")?.log2()))
                }),
            ),
        ],
    });
    let registered = runtime.types.register(Rc::clone(&calc));
    debug_assert!(registered.is_ok(), "Calc collides with a seeded type");
    root.insert("Calc", Variable::new(Value::Qlass(calc)));
}

/// Native member lookup on composite and scalar values. `None` means the
/// target has no such native member; the caller decides whether that is
/// Void (objeqts) or an error.
pub(crate) fn member(target: &Value, member: &str) -> Option<Value> {
    match target {
        Value::Qollection(qollection) => match member {
            "length" => Some(Value::Number(qollection.borrow().len() as f64)),
            "add" => {
                let target = Rc::clone(qollection);
                Some(value("add", Some(1), move |_, _, args, _| {
                    target
                        .borrow_mut()
                        .push(args.first().cloned().unwrap_or(Value::Void));
                    Ok(Value::Void)
                }))
            }
            "get" => {
                let target = Rc::clone(qollection);
                Some(value("get", Some(1), move |_, _, args, _| {
                    let index = number_arg(args, 0, "index")?;
                    Ok(target.borrow().slot(index)?.get())
                }))
            }
            "set" => {
                let target = Rc::clone(qollection);
                Some(value("set", Some(2), move |_, _, args, _| {
                    let index = number_arg(args, 0, "index")?;
                    let slot = target.borrow().slot(index)?;
                    slot.set(args.get(1).cloned().unwrap_or(Value::Void))?;
                    Ok(Value::Void)
                }))
            }
            "forEach" => {
                let target = Rc::clone(qollection);
                Some(value("forEach", Some(1), move |rt, qontext, args, _| {
                    let callback = args.first().cloned().unwrap_or(Value::Void);
                    // Snapshot so the callback can mutate the qollection.
                    let items = target.borrow().values();
                    for item in items {
                        rt.call(callback.clone(), &[item], qontext, None)?;
                    }
                    Ok(Value::Void)
                }))
            }
            _ => None,
        },
        Value::Objeqt(objeqt) => match member {
            "length" => Some(Value::Number(objeqt.borrow().len() as f64)),
            _ => None,
        },
        Value::String(s) => match member {
            "length" => Some(Value::Number(s.chars().count() as f64)),
            _ => None,
        },
        _ => None,
    }
}
