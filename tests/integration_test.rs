use std::{cell::RefCell, rc::Rc};

use sqr::error::{NameError, ParseError, SqrError, TypeError};
use sqr::runtime::value::Value;
use sqr::runtime::Runtime;

fn run(source: &str) -> (Result<Value, SqrError>, String) {
    let output = Rc::new(RefCell::new(Vec::new()));
    let runtime = Runtime::new(output.clone());
    let result = runtime.run(source);
    let text = String::from_utf8(output.borrow().clone()).expect("output should be valid UTF-8");
    (result, text)
}

fn eval(source: &str) -> Value {
    let (result, _) = run(source);
    result.expect("program should run")
}

fn eval_err(source: &str) -> SqrError {
    let (result, _) = run(source);
    result.expect_err("program should fail")
}

#[test]
fn test_precedence() {
    assert_eq!(eval("return 2 + 3 * 4;"), Value::Number(14.0));
}

#[test]
fn test_left_associativity() {
    assert_eq!(eval("return 8 - 3 - 2;"), Value::Number(3.0));
}

#[test]
fn test_grouping() {
    assert_eq!(eval("return (2 + 3) * 4;"), Value::Number(20.0));
}

#[test]
fn test_comparisons_and_logic() {
    assert_eq!(eval("return 1 < 2 && 3 >= 3;"), Value::Boolean(true));
    assert_eq!(eval("return 1 == 2 || !false;"), Value::Boolean(true));
    assert_eq!(eval("return !(1 < 2 && true);"), Value::Boolean(false));
    assert_eq!(eval("return \"a\" + 1;"), Value::String("a1".to_string()));
}

#[test]
fn test_outer_variable_mutable_from_nested_scope() {
    let source = r#"
    var a = 1;
    if (true) { a = 2; }
    return a;
    "#;
    assert_eq!(eval(source), Value::Number(2.0));
}

#[test]
fn test_shadowing_leaves_outer_binding_alone() {
    let source = r#"
    var a = 1;
    if (true) {
        var a = 5;
        a = 6;
    }
    return a;
    "#;
    assert_eq!(eval(source), Value::Number(1.0));
}

#[test]
fn test_return_short_circuits_body() {
    let (result, output) = run("print(1); return 10; print(2);");
    assert_eq!(result.unwrap(), Value::Number(10.0));
    assert_eq!(output, "1\n");
}

#[test]
fn test_shorthand_return() {
    assert_eq!(eval("= 2 + 3;"), Value::Number(5.0));
}

#[test]
fn test_while_loop() {
    let source = r#"
    var total = 0;
    var i = 0;
    while (i < 5) {
        total += i;
        i += 1;
    }
    return total;
    "#;
    assert_eq!(eval(source), Value::Number(10.0));
}

#[test]
fn test_do_while_runs_at_least_once() {
    let source = r#"
    var n = 0;
    do { n += 1; } while (false);
    return n;
    "#;
    assert_eq!(eval(source), Value::Number(1.0));
}

#[test]
fn test_for_loop() {
    let source = r#"
    var total = 0;
    for (var i = 1; i <= 4; i += 1) {
        total += i;
    }
    return total;
    "#;
    assert_eq!(eval(source), Value::Number(10.0));
}

#[test]
fn test_labeled_break_targets_outer_loop() {
    let source = r#"
    var hits = 0;
    var i = 0;
    while outer (i < 3) {
        i += 1;
        var j = 0;
        while (j < 3) {
            j += 1;
            hits += 1;
            break outer;
        }
    }
    return hits;
    "#;
    assert_eq!(eval(source), Value::Number(1.0));
}

#[test]
fn test_unlabeled_break_targets_innermost_loop() {
    let source = r#"
    var hits = 0;
    for (var i = 0; i < 2; i += 1) {
        for (var j = 0; j < 10; j += 1) {
            hits += 1;
            break;
        }
    }
    return hits;
    "#;
    assert_eq!(eval(source), Value::Number(2.0));
}

#[test]
fn test_labeled_continue() {
    let source = r#"
    var total = 0;
    for outer (var i = 0; i < 3; i += 1) {
        for (var j = 0; j < 3; j += 1) {
            if (j > 0) { continue outer; }
            total += 1;
        }
    }
    return total;
    "#;
    assert_eq!(eval(source), Value::Number(3.0));
}

#[test]
fn test_break_escaping_to_top_level_is_an_error() {
    assert!(matches!(
        eval_err("break;"),
        SqrError::Type(TypeError::SignalEscaped { .. })
    ));
}

#[test]
fn test_funqtion_declaration_and_recursion() {
    let source = r#"
    funqtion fib(n) {
        if (n < 2) { return n; }
        return fib(n - 1) + fib(n - 2);
    }
    for (var i = 0; i < 8; i += 1) {
        print(fib(i));
    }
    "#;
    let (result, output) = run(source);
    assert!(result.is_ok());
    assert_eq!(output, "0\n1\n1\n2\n3\n5\n8\n13\n");
}

#[test]
fn test_missing_required_parameter() {
    let source = r#"
    funqtion f(a, b?) { return 1; }
    return f();
    "#;
    assert!(matches!(
        eval_err(source),
        SqrError::Type(TypeError::MissingParameter { .. })
    ));
}

#[test]
fn test_optional_parameter_defaults() {
    let source = r#"
    funqtion f(a, b = 2) { return a + b; }
    return f(3);
    "#;
    assert_eq!(eval(source), Value::Number(5.0));
}

#[test]
fn test_omitted_optional_parameter_is_void() {
    let source = r#"
    funqtion f(a, b?) { return b; }
    return f(1);
    "#;
    assert_eq!(eval(source), Value::Void);
}

#[test]
fn test_inline_funqtion_closure() {
    let source = r#"
    funqtion makeCounter() {
        var i = 0;
        return inline() {
            i += 1;
            return i;
        };
    }
    var counter = makeCounter();
    counter();
    return counter();
    "#;
    assert_eq!(eval(source), Value::Number(2.0));
}

#[test]
fn test_qollection_literal_and_index_access() {
    assert_eq!(eval("var q = [1, 2, 3]; return q:1;"), Value::Number(2.0));
}

#[test]
fn test_qollection_bounds() {
    assert!(matches!(
        eval_err("var q = [1, 2, 3]; return q:3;"),
        SqrError::Type(TypeError::IndexOutOfBounds { .. })
    ));
}

#[test]
fn test_negative_index_read_is_out_of_bounds() {
    assert!(matches!(
        eval_err("var q = [1, 2, 3]; return q:-1;"),
        SqrError::Type(TypeError::IndexOutOfBounds { .. })
    ));
}

#[test]
fn test_negative_index_write_is_out_of_bounds() {
    assert!(matches!(
        eval_err("var q = [1, 2, 3]; q:-1 = 9;"),
        SqrError::Type(TypeError::IndexOutOfBounds { .. })
    ));
}

#[test]
fn test_qollection_members() {
    let source = r#"
    var q = [1, 2];
    q:add(7);
    q:set(0, 9);
    print(q:get(0));
    return q:length;
    "#;
    let (result, output) = run(source);
    assert_eq!(result.unwrap(), Value::Number(3.0));
    assert_eq!(output, "9\n");
}

#[test]
fn test_qollection_for_each() {
    let source = r#"
    var total = 0;
    var q = [1, 2, 3];
    q:forEach(inline(n) { total += n; });
    return total;
    "#;
    assert_eq!(eval(source), Value::Number(6.0));
}

#[test]
fn test_objeqt_literal() {
    let source = r#"
    var o = { a: 1, b: 2 };
    return o:a + o:b;
    "#;
    assert_eq!(eval(source), Value::Number(3.0));
}

#[test]
fn test_objeqt_absent_key_reads_void() {
    assert_eq!(eval("var o = { a: 1 }; return o:missing;"), Value::Void);
}

#[test]
fn test_objeqt_member_write_creates_slot() {
    let source = r#"
    var o = { a: 1 };
    o:b = 5;
    return o:b;
    "#;
    assert_eq!(eval(source), Value::Number(5.0));
}

#[test]
fn test_mutators_read_modify_write() {
    assert_eq!(eval("var a = 10; a -= 4; return a;"), Value::Number(6.0));
    assert_eq!(eval("var a = 3; a *= 4; return a;"), Value::Number(12.0));
    let source = r#"
    var o = { n: 4 };
    o:n += 2;
    return o:n;
    "#;
    assert_eq!(eval(source), Value::Number(6.0));
}

#[test]
fn test_reference_declaration_aliases_storage() {
    let source = r#"
    var a = 1;
    var& b = a;
    b = 5;
    return a;
    "#;
    assert_eq!(eval(source), Value::Number(5.0));
}

#[test]
fn test_typed_declaration_rejects_wrong_type() {
    assert!(matches!(
        eval_err("@Number n = 1; n = \"text\";"),
        SqrError::Type(TypeError::WrongType { .. })
    ));
}

#[test]
fn test_const_allows_one_write() {
    assert_eq!(eval("const c = 1; return c;"), Value::Number(1.0));
    assert!(matches!(
        eval_err("const c = 1; c = 2;"),
        SqrError::Name(NameError::Readonly)
    ));
}

#[test]
fn test_qlass_spawn_and_self() {
    let source = r#"
    qlass Point {
        var x;
        var y;
        funqtion init(x, y) {
            self:x = x;
            self:y = y;
        }
        funqtion sum() {
            return self:x + self:y;
        }
    }
    var p = new Point(3, 4);
    return p:sum();
    "#;
    assert_eq!(eval(source), Value::Number(7.0));
}

#[test]
fn test_qlass_field_initializer_runs_per_spawn() {
    let source = r#"
    qlass Box {
        var items = [];
    }
    var a = new Box();
    var b = new Box();
    a:items:add(1);
    return b:items:length;
    "#;
    assert_eq!(eval(source), Value::Number(0.0));
}

#[test]
fn test_typed_qlass_declaration() {
    let source = r#"
    qlass Point {
        var x;
    }
    @Point p = new Point();
    return p:x;
    "#;
    assert_eq!(eval(source), Value::Void);
}

#[test]
fn test_export_reaches_module() {
    let output = Rc::new(RefCell::new(Vec::new()));
    let runtime = Runtime::new(output);
    runtime.run("export var answer = 42;").unwrap();
    let module = runtime.module().borrow();
    assert_eq!(
        module.exports.get("answer").unwrap().get(),
        Value::Number(42.0)
    );
}

#[test]
fn test_calc_statics() {
    assert_eq!(eval("return Calc:sqrt(9);"), Value::Number(3.0));
    assert_eq!(eval("return Calc:pow(2, 10);"), Value::Number(1024.0));
    assert_eq!(eval("return Calc:abs(0 - 7);"), Value::Number(7.0));
    assert_eq!(eval("return Calc:round(2.6);"), Value::Number(3.0));
}

#[test]
fn test_string_length_member() {
    assert_eq!(eval("return \"hello\":length;"), Value::Number(5.0));
}

#[test]
fn test_print_writes_to_sink() {
    let (_, output) = run("print(\"hi\"); print(42);");
    assert_eq!(output, "hi\n42\n");
}

#[test]
fn test_last_statement_value_is_echoed() {
    assert_eq!(eval("1 + 2;"), Value::Number(3.0));
}

#[test]
fn test_unresolved_identifier() {
    assert!(matches!(
        eval_err("return missing;"),
        SqrError::Name(NameError::Unresolved { .. })
    ));
}

#[test]
fn test_duplicate_declaration() {
    assert!(matches!(
        eval_err("var a = 1; var a = 2;"),
        SqrError::Name(NameError::Duplicate { .. })
    ));
}

#[test]
fn test_import_is_reserved() {
    assert!(matches!(
        eval_err("import something;"),
        SqrError::Parse(ParseError::ReservedKeyword { .. })
    ));
}

#[test]
fn test_else_if_chain() {
    let source = r#"
    funqtion grade(n) {
        if (n > 2) { return "big"; }
        else if (n > 1) { return "mid"; }
        else { return "small"; }
    }
    return grade(2);
    "#;
    assert_eq!(eval(source), Value::String("mid".to_string()));
}

#[test]
fn test_dangling_operator_is_a_parse_error() {
    assert!(matches!(
        eval_err("return 1 + ;"),
        SqrError::Parse(ParseError::MissingOperand { .. })
    ));
    assert!(matches!(
        eval_err("return 1 + 2 * ;"),
        SqrError::Parse(ParseError::MissingOperand { .. })
    ));
}

#[test]
fn test_calling_a_number_fails() {
    assert!(matches!(
        eval_err("var n = 3; return n();"),
        SqrError::Type(TypeError::NotCallable { .. })
    ));
}
