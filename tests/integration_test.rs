// Integration tests for the C interpreter

use cwalk::config::InterpreterConfig;
use cwalk::console::Console;
use cwalk::interpreter::{Interpreter, RuntimeError};
use cwalk::parser::parse_source;
use cwalk::{interpret, Error};

struct Run {
    result: Result<i64, RuntimeError>,
    output: Vec<String>,
}

fn run_with(source: &str, config: InterpreterConfig, input: &str) -> Run {
    let program = parse_source(source).expect("Parsing failed");
    let mut interpreter = Interpreter::new(program, config, Console::scripted(input));
    let result = interpreter.run();
    Run {
        result,
        output: interpreter.into_console().output(),
    }
}

fn run(source: &str) -> Run {
    run_with(source, InterpreterConfig::default().without_prompt(), "")
}

#[test]
fn test_call_result_inside_expression() {
    let source = r#"
        int f() {
            return 42;
        }

        int main() {
            int x;
            x = f() + 1;
            PRINT(x);
            return x;
        }
    "#;

    let run = run(source);
    assert_eq!(run.result, Ok(43));
    assert_eq!(run.output, vec!["43"]);
}

#[test]
fn test_early_return() {
    let source = r#"
        int pick(int cond) {
            if (cond) return 1;
            return 2;
        }

        int main() {
            PRINT(pick(5));
            PRINT(pick(0));
            return 0;
        }
    "#;

    assert_eq!(run(source).output, vec!["1", "2"]);
}

#[test]
fn test_statements_after_return_never_run() {
    let source = r#"
        int f() {
            PRINT(1);
            return 0;
            PRINT(2);
        }

        int main() {
            f();
            PRINT(3);
            return 0;
        }
    "#;

    assert_eq!(run(source).output, vec!["1", "3"]);
}

#[test]
fn test_array_element_print() {
    let source = r#"
        int main() {
            int a[3];
            a[1] = 5;
            PRINT(a[1]);
            return 0;
        }
    "#;

    assert_eq!(run(source).output, vec!["5"]);
}

#[test]
fn test_read_then_print() {
    let source = r#"
        int main() {
            int x;
            x = GET();
            PRINT(x);
            return 0;
        }
    "#;

    let run = run_with(source, InterpreterConfig::default().without_prompt(), "7\n");
    assert_eq!(run.result, Ok(0));
    assert_eq!(run.output, vec!["7"]);

    let prompted = run_with(source, InterpreterConfig::default(), "7\n");
    assert_eq!(
        prompted.output,
        vec!["Please Input an Integer Value: ", "7"]
    );
}

#[test]
fn test_malloc_free_round_trip() {
    let source = r#"
        int main() {
            int *p;
            p = MALLOC(8);
            *p = 9;
            PRINT(*p);
            FREE(p);
            return 0;
        }
    "#;

    let run = run(source);
    assert_eq!(run.result, Ok(0));
    assert_eq!(run.output, vec!["9"]);
}

#[test]
fn test_arrays_start_zeroed() {
    let source = r#"
        int main() {
            int a[6];
            char s[4];
            int i;
            int sum = 0;
            for (i = 0; i < 6; i++) sum = sum + a[i];
            for (i = 0; i < 4; i++) sum = sum + s[i];
            PRINT(sum);
            return 0;
        }
    "#;

    assert_eq!(run(source).output, vec!["0"]);
}

#[test]
fn test_pointer_stride_is_eight_bytes() {
    let source = r#"
        int main() {
            int *p = MALLOC(64);
            int *q = p + 3;
            PRINT(q - p);
            PRINT((q - p) * 8 == 24);
            return 0;
        }
    "#;

    assert_eq!(run(source).output, vec!["3", "1"]);
}

#[test]
fn test_division_by_zero_is_fatal() {
    let source = r#"
        int main() {
            int zero = 0;
            PRINT(1);
            PRINT(10 / zero);
            PRINT(2);
            return 0;
        }
    "#;

    let run = run(source);
    assert!(matches!(
        run.result,
        Err(RuntimeError::DivisionError { .. })
    ));
    assert_eq!(run.output, vec!["1"]);
}

#[test]
fn test_division_truncates_toward_zero() {
    let source = "int main() { PRINT(7 / 2); PRINT(-7 / 2); PRINT(7 % -3); return 0; }";
    assert_eq!(run(source).output, vec!["3", "-3", "1"]);
}

#[test]
fn test_double_free_is_fatal() {
    let source = r#"
        int main() {
            int *p = MALLOC(8);
            FREE(p);
            FREE(p);
            return 0;
        }
    "#;

    assert!(matches!(
        run(source).result,
        Err(RuntimeError::DoubleFree { .. })
    ));
}

#[test]
fn test_globals_visible_in_functions() {
    let source = r#"
        int counter = 10;
        int table[2];

        void bump() {
            counter = counter + 1;
            table[1] = counter;
        }

        int main() {
            bump();
            bump();
            PRINT(counter);
            PRINT(table[1]);
            return 0;
        }
    "#;

    assert_eq!(run(source).output, vec!["12", "12"]);
}

#[test]
fn test_locals_shadow_globals() {
    let source = r#"
        int x = 1;

        int main() {
            int x = 2;
            {
                int x = 3;
                PRINT(x);
            }
            PRINT(x);
            return 0;
        }
    "#;

    let program = parse_source(source).unwrap();
    let mut interpreter = Interpreter::new(
        program,
        InterpreterConfig::default(),
        Console::scripted(""),
    );
    interpreter.run().unwrap();
    assert_eq!(interpreter.console().output(), vec!["3", "2"]);
    assert_eq!(interpreter.global_value("x"), Some(1));
}

#[test]
fn test_return_inside_loop() {
    let source = r#"
        int find(int target) {
            int i;
            for (i = 0; i < 100; i++) {
                if (i * i >= target) return i;
            }
            return -1;
        }

        int main() {
            PRINT(find(50));
            PRINT(find(100000));
            return 0;
        }
    "#;

    assert_eq!(run(source).output, vec!["8", "-1"]);
}

#[test]
fn test_stack_overflow() {
    let source = r#"
        int down(int n) {
            return down(n + 1);
        }

        int main() {
            return down(0);
        }
    "#;

    let run = run_with(
        source,
        InterpreterConfig::default().with_max_call_depth(32),
        "",
    );
    assert!(matches!(
        run.result,
        Err(RuntimeError::StackOverflow { limit: 32, .. })
    ));
}

#[test]
fn test_default_depth_limit_is_reached_before_native_overflow() {
    let source = r#"
        int count(int n) {
            if (n == 0) return 0;
            return count(n - 1) + 1;
        }

        int main() {
            PRINT(count(1000));
            return count(2000);
        }
    "#;

    let run = run(source);
    assert_eq!(run.output, vec!["1000"]);
    assert!(matches!(
        run.result,
        Err(RuntimeError::StackOverflow { limit: 1024, .. })
    ));
}

#[test]
fn test_linked_cells_on_the_heap() {
    // Each node is two cells: value, next
    let source = r#"
        int *push(int *head, int value) {
            int *node = MALLOC(16);
            node[0] = value;
            node[1] = head;
            return node;
        }

        int main() {
            int *list = 0;
            int i;
            for (i = 1; i <= 4; i++) list = push(list, i * i);
            while (list != 0) {
                int *next = list[1];
                PRINT(list[0]);
                FREE(list);
                list = next;
            }
            return 0;
        }
    "#;

    let run = run(source);
    assert_eq!(run.result, Ok(0));
    assert_eq!(run.output, vec!["16", "9", "4", "1"]);
}

#[test]
fn test_interpret_reports_parse_and_runtime_errors() {
    let parse = interpret(
        "int main() { return y; }",
        InterpreterConfig::default(),
        Console::scripted(""),
    );
    assert!(matches!(parse, Err(Error::Parse(_))));

    let runtime = interpret(
        "int main() {\n  int *p = 0;\n  return *p;\n}",
        InterpreterConfig::default(),
        Console::scripted(""),
    );
    match runtime {
        Err(err @ Error::Runtime { .. }) => {
            assert_eq!(err.exit_code(), 1);
            if let Error::Runtime { source, backtrace } = err {
                assert!(matches!(source, RuntimeError::NullDereference { .. }));
                assert_eq!(backtrace, vec!["main (3:3)"]);
            }
        }
        other => panic!("Expected runtime error, got {:?}", other),
    }
}

#[test]
fn test_missing_main() {
    let run = run("int helper() { return 1; }");
    assert_eq!(run.result, Err(RuntimeError::NoMainFunction));
}
