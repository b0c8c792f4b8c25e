//! Whole-program scenarios exercising the full scan/parse/eval pipeline
//! the way puzzle programs actually use the language.

use riddle::{run_program, Value};

fn eval_source(source: &str) -> Value {
    let (value, _) = match run_program("test.rdl", source) {
        Ok(result) => result,
        Err(error) => panic!("program failed: {error}"),
    };
    value
}

#[test]
fn hello_world_runs_clean() {
    let value = eval_source(r#"log("Hello, World!");"#);
    assert!(matches!(value, Value::Undefined));
}

#[test]
fn immediately_invoked_function() {
    eval_source("let r = (func (x) { return x + 1 })(4); assert(r, 5);");
}

#[test]
fn closure_over_counter() {
    eval_source(
        "let mk = func () { let n = 0; return func () { n = n + 1; return n } };
         let c = mk();
         assert(c(), 1);
         assert(c(), 2);
         assert(c(), 3);",
    );
}

#[test]
fn set_built_from_a_dict_closure() {
    eval_source(
        r#"let set = func (items) {
             let d = {};
             for (let i = 0; i < len(items); i = i + 1) {
               d[str(items[i])] = true;
             }
             return {
               'has': func (x) { return d[str(x)] == true }
             }
           };
           let s = set([1, 2]);
           assert(s.has(1), true);
           assert(s.has(3), false);"#,
    );
}

#[test]
fn computed_and_quoted_dict_keys() {
    eval_source(
        r#"let k = "a";
           let f = {k: 2};
           assert(f.a, 2);
           let f2 = {'a': 2};
           assert(f2.a, 2);"#,
    );
}

#[test]
fn loop_with_break_and_continue() {
    eval_source(
        "let s = 0;
         for (let i = 0; i < 10; i = i + 1) {
           if (i == 5) { break }
           if (i == 2) { continue }
           s = s + i;
         }
         assert(s, 0 + 1 + 3 + 4);",
    );
}

#[test]
fn recursive_factorial() {
    eval_source(
        "let factorial = func (n) {
           if (n == 0) { return 1 }
           return n * factorial(n - 1)
         };
         assert(factorial(10), 3628800);",
    );
}

#[test]
fn fibonacci_with_a_list_as_scratch_space() {
    eval_source(
        "let fib = [0, 1];
         while (len(fib) < 10) {
           append(fib, fib[len(fib) - 1] + fib[len(fib) - 2]);
         }
         assert(fib[9], 34);",
    );
}

#[test]
fn grouping_words_by_first_letter() {
    eval_source(
        r#"let words = ["ant", "bee", "ape", "bat"];
           let groups = {};
           for (let i = 0; i < len(words); i = i + 1) {
             if (type(groups[words[i][0]]) == "undefined") {
               groups[words[i][0]] = [];
             }
             append(groups[words[i][0]], words[i]);
           }
           assert(len(groups["a"]), 2);
           assert(len(groups["b"]), 2);
           assert(groups["a"][1], "ape");"#,
    );
}

#[test]
fn program_value_is_printed_form_of_last_statement() {
    assert_eq!(eval_source("let l = [1, 2]; l;").to_string(), "[1, 2]");
    assert_eq!(eval_source(r#""done";"#).to_string(), "done");
}

#[test]
fn mutation_is_visible_through_aliases() {
    eval_source(
        "let a = [1, 2, 3];
         let b = a;
         append(b, 4);
         assert(len(a), 4);
         assert(a[3], 4);",
    );
}

#[test]
fn nested_data_round_trip() {
    eval_source(
        r#"let grid = {};
           for (let y = 0; y < 3; y = y + 1) {
             for (let x = 0; x < 3; x = x + 1) {
               grid[str(x) + "," + str(y)] = x * y;
             }
           }
           assert(grid["2,2"], 4);
           assert(len(keys(grid)), 9);"#,
    );
}
