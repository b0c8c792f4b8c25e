use std::env;
use std::fs;

use riddle::interpreter::{Interrupt, RuntimeError};
use riddle::{run_program, RunError, Value};

fn eval_source(source: &str) -> Value {
    let (value, _) = match run_program("test.rdl", source) {
        Ok(result) => result,
        Err(error) => panic!("program failed: {error}"),
    };
    value
}

fn eval_failure(source: &str) -> RuntimeError {
    match run_program("test.rdl", source) {
        Err(RunError::Eval(Interrupt::Failure(error))) => error,
        Err(other) => panic!("expected a runtime failure, got: {other}"),
        Ok((value, _)) => panic!("expected a runtime failure, got value: {value}"),
    }
}

#[test]
fn len_of_strings_and_lists() {
    eval_source(r#"assert(len("abc"), 3); assert(len([1, 2]), 2); assert(len([]), 0);"#);
}

#[test]
fn len_of_a_number_is_a_type_error() {
    assert!(matches!(eval_failure("len(1);"), RuntimeError::Type { .. }));
}

#[test]
fn append_then_read_last() {
    eval_source("let l = [1]; append(l, 7); assert(l[len(l) - 1], 7);");
}

#[test]
fn prepend_shifts_existing_items() {
    eval_source("let l = [2, 3]; prepend(l, 1); assert(l[0], 1); assert(l[2], 3);");
}

#[test]
fn pop_returns_the_last_item() {
    eval_source("let l = [1, 2]; assert(pop(l), 2); assert(len(l), 1);");
}

#[test]
fn pop_on_empty_list_is_an_index_error() {
    assert!(matches!(
        eval_failure("pop([]);"),
        RuntimeError::Index { .. }
    ));
}

#[test]
fn popat_removes_in_the_middle() {
    eval_source("let l = [1, 2, 3]; assert(popat(l, 1), 2); assert(l[1], 3); assert(len(l), 2);");
}

#[test]
fn popat_out_of_bounds_is_an_index_error() {
    assert!(matches!(
        eval_failure("popat([1], 4);"),
        RuntimeError::Index { .. }
    ));
}

#[test]
fn prepop_removes_the_first_item() {
    eval_source("let l = [1, 2]; assert(prepop(l), 1); assert(l[0], 2);");
}

#[test]
fn list_methods_dispatch_through_properties() {
    eval_source(
        "let l = [1];
         l.append(2);
         l.prepend(0);
         assert(l[0], 0);
         assert(l.pop(), 2);
         assert(l.prepop(), 0);
         assert(l.popat(0), 1);
         assert(len(l), 0);",
    );
}

#[test]
fn unknown_list_method_fails() {
    assert!(matches!(
        eval_failure("let l = [1]; l.reverse();"),
        RuntimeError::Type { .. }
    ));
}

#[test]
fn list_property_without_call_fails() {
    assert!(matches!(
        eval_failure("let l = [1]; l.length;"),
        RuntimeError::Type { .. }
    ));
}

#[test]
fn keys_and_values_of_a_single_entry_dict() {
    eval_source(
        r#"let d = {'a': 1};
           assert(keys(d)[0], "a");
           assert(values(d)[0], 1);
           assert(len(keys(d)), 1);"#,
    );
}

#[test]
fn keys_of_a_list_is_a_type_error() {
    assert!(matches!(
        eval_failure("keys([1]);"),
        RuntimeError::Type { .. }
    ));
}

#[test]
fn delete_removes_a_key() {
    eval_source(
        r#"let d = {'a': 1};
           assert(delete(d, "a"), undefined);
           assert(len(keys(d)), 0);"#,
    );
}

#[test]
fn type_names() {
    eval_source(
        r#"assert(type(1), "number");
           assert(type("x"), "string");
           assert(type(true), "bool");
           assert(type(undefined), "undefined");
           assert(type([]), "list");
           assert(type({}), "dict");
           assert(type(func () {}), "function");
           assert(type(len), "function");"#,
    );
}

#[test]
fn str_of_scalars() {
    eval_source(
        r#"assert(str(1.5), "1.5");
           assert(str(3), "3");
           assert(str(true), "true");
           assert(str("already"), "already");"#,
    );
}

#[test]
fn str_of_a_list_is_a_type_error() {
    assert!(matches!(
        eval_failure("str([1]);"),
        RuntimeError::Type { .. }
    ));
}

#[test]
fn num_parses_floats() {
    eval_source(r#"assert(num("3.14"), 3.14); assert(num("42"), 42);"#);
}

#[test]
fn num_of_garbage_is_a_type_error() {
    assert!(matches!(
        eval_failure(r#"num("abc");"#),
        RuntimeError::Type { .. }
    ));
}

#[test]
fn floor_truncates_toward_zero() {
    eval_source("assert(floor(2.7), 2); assert(floor(-2.5), -2);");
}

#[test]
fn assert_failure_message() {
    match eval_failure("assert(1, 2);") {
        RuntimeError::Runtime { message, .. } => {
            assert_eq!(message, "assert failed: 1 == 2");
        }
        other => panic!("expected a runtime error, got: {other}"),
    }
}

#[test]
fn assert_wrong_arity() {
    assert!(matches!(
        eval_failure("assert(1);"),
        RuntimeError::Arity { .. }
    ));
}

#[test]
fn log_needs_at_least_one_argument() {
    assert!(matches!(eval_failure("log();"), RuntimeError::Arity { .. }));
}

#[test]
fn time_returns_milliseconds_since_the_epoch() {
    eval_source("assert(time() > 0, true);");
}

#[test]
fn import_exposes_module_bindings_and_natives() {
    let path = env::temp_dir().join("riddle_import_module.rdl");
    fs::write(&path, "let answer = 42;\n").unwrap();
    let source = format!(
        r#"let m = import("{}");
           assert(m.answer, 42);
           assert(type(m.len), "function");"#,
        path.display()
    );
    eval_source(&source);
}

#[test]
fn import_of_a_missing_file_fails() {
    assert!(matches!(
        eval_failure(r#"import("/definitely/not/here.rdl");"#),
        RuntimeError::Runtime { .. }
    ));
}

#[test]
fn read_lines_streams_in_order() {
    let path = env::temp_dir().join("riddle_read_lines.txt");
    fs::write(&path, "alpha\nbeta\ngamma\n").unwrap();
    let source = format!(
        r#"let lines = [];
           read_lines("{}", func (line) {{ append(lines, line); }});
           assert(len(lines), 3);
           assert(lines[0], "alpha");
           assert(lines[2], "gamma");"#,
        path.display()
    );
    eval_source(&source);
}

#[test]
fn read_lines_on_a_missing_file_fails() {
    assert!(matches!(
        eval_failure(r#"read_lines("/definitely/not/here.txt", func (l) {});"#),
        RuntimeError::Runtime { .. }
    ));
}
