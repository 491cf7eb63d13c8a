#[cfg(test)]
mod interpreter_tests {
    use tree_lox as lox;

    use lox::lox::{Lox, EX_USAGE};

    /// Run a program with a fresh interpreter and return the sink contents
    /// (program output and any diagnostics).
    fn run(code: &str) -> String {
        let mut buffer: Vec<u8> = Vec::new();
        {
            let mut lox = Lox::new(&mut buffer);
            lox.run(code.as_bytes());
        }

        String::from_utf8(buffer).expect("output should be UTF-8")
    }

    fn run_with_flags(code: &str) -> (String, bool, bool) {
        let mut buffer: Vec<u8> = Vec::new();
        let (had_error, had_runtime_error) = {
            let mut lox = Lox::new(&mut buffer);
            lox.run(code.as_bytes());
            (lox.had_error(), lox.had_runtime_error())
        };

        let output = String::from_utf8(buffer).expect("output should be UTF-8");
        (output, had_error, had_runtime_error)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions and numerics
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(run("print 1 + 2 * 3;"), "7\n");
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(run("print \"hi\" + \" \" + \"there\";"), "hi there\n");
    }

    #[test]
    fn integer_and_double_division() {
        assert_eq!(run("print 3 / 2;"), "1\n");
        assert_eq!(run("print 3 / 2.0;"), "1.5\n");
        assert_eq!(run("print -7 / 2;"), "-3\n");
    }

    #[test]
    fn cross_kind_numeric_equality() {
        assert_eq!(run("print 10 == 10.0;"), "true\n");
        assert_eq!(run("print 10 != 10.0;"), "false\n");
        assert_eq!(run("print 1 == true;"), "false\n");
        assert_eq!(run("print nil == nil;"), "true\n");
        assert_eq!(run("print \"a\" == \"a\";"), "true\n");
    }

    #[test]
    fn integer_addition_overflows_to_double() {
        assert_eq!(run("print 2147483647 + 1;"), "2147483648\n");
        assert_eq!(run("print 2147483647 + 2147483646;"), "4294967293\n");
    }

    #[test]
    fn integer_multiplication_overflows_to_double() {
        assert_eq!(run("print 100000 * 100000;"), "10000000000\n");
        assert_eq!(run("print 100 * 100;"), "10000\n");
    }

    #[test]
    fn int_min_literal_and_its_negation() {
        assert_eq!(run("print -2147483648;"), "-2147483648\n");
        // Negating i32::MIN cannot stay an integer.
        assert_eq!(run("var a = -2147483648; print -a;"), "2147483648\n");
        assert_eq!(run("var a = -2147483648; print a - 1;"), "-2147483649\n");
    }

    #[test]
    fn integer_division_by_zero_falls_back_to_double() {
        assert_eq!(run("print 3 / 0;"), "inf\n");
    }

    #[test]
    fn unary_operators() {
        assert_eq!(run("print -3 + 5;"), "2\n");
        assert_eq!(run("print !true; print !nil; print !0;"), "false\ntrue\nfalse\n");
    }

    #[test]
    fn comparisons_work_across_integer_and_double() {
        assert_eq!(run("print 1 < 1.5; print 2 >= 2.0;"), "true\ntrue\n");
    }

    #[test]
    fn logical_operators_yield_the_deciding_operand() {
        assert_eq!(run("print nil or \"yes\";"), "yes\n");
        assert_eq!(run("print 1 or 2;"), "1\n");
        assert_eq!(run("print nil and 2;"), "nil\n");
        assert_eq!(run("print 1 and 2;"), "2\n");
    }

    #[test]
    fn logical_operators_short_circuit() {
        assert_eq!(
            run("fun boom() { print \"boom\"; return true; } print false and boom();"),
            "false\n"
        );
    }

    #[test]
    fn only_nil_and_false_are_falsy() {
        assert_eq!(
            run("if (0) print \"zero\"; if (\"\") print \"empty\"; if (nil) print \"nil\";"),
            "zero\nempty\n"
        );
    }

    #[test]
    fn value_formatting() {
        assert_eq!(
            run("fun f() {} class C {} print f; print C; print C(); print clock; print nil;"),
            "<fn f>\nC\nC instance\n<native fn>\nnil\n"
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scoping and closures
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn block_shadowing() {
        assert_eq!(
            run("var a = 1; { var a = 2; print a; } print a;"),
            "2\n1\n"
        );
    }

    #[test]
    fn nested_scopes_see_enclosing_bindings() {
        let code = "\
            var a = \"global a\";\n\
            var b = \"global b\";\n\
            {\n\
                var a = \"outer a\";\n\
                {\n\
                    print a;\n\
                    print b;\n\
                }\n\
            }";

        assert_eq!(run(code), "outer a\nglobal b\n");
    }

    #[test]
    fn assignment_is_an_expression() {
        assert_eq!(run("var a = 1; print a = 2; print a;"), "2\n2\n");
    }

    #[test]
    fn counter_closure_keeps_private_state() {
        let code = "\
            fun makeCounter() {\n\
                var n = 0;\n\
                fun count() { n = n + 1; print n; }\n\
                return count;\n\
            }\n\
            var c = makeCounter();\n\
            c(); c(); c();";

        assert_eq!(run(code), "1\n2\n3\n");
    }

    #[test]
    fn closure_survives_its_defining_scope() {
        let code = "\
            var funcRef;\n\
            {\n\
                var divisor = 2;\n\
                fun printHalf(n) { print n / divisor; }\n\
                funcRef = printHalf;\n\
            }\n\
            funcRef(8);";

        assert_eq!(run(code), "4\n");
    }

    #[test]
    fn closures_bind_lexically_not_dynamically() {
        // A later shadowing declaration must not change what the closure
        // sees.
        let code = "\
            var a = \"global\";\n\
            {\n\
                fun showA() { print a; }\n\
                showA();\n\
                var a = \"block\";\n\
                showA();\n\
            }";

        assert_eq!(run(code), "global\nglobal\n");
    }

    #[test]
    fn while_loop() {
        assert_eq!(
            run("var a = 0; while (a < 5) { print a; a = a + 1; }"),
            "0\n1\n2\n3\n4\n"
        );
    }

    #[test]
    fn for_loop_variants() {
        let code = "\
            for (var a = 0; a < 3; a = a + 1) { print a; }\n\
            var b = 10;\n\
            for (; b < 12;) { print b; b = b + 1; }";

        assert_eq!(run(code), "0\n1\n2\n10\n11\n");
    }

    #[test]
    fn recursion() {
        let code = "\
            fun fib(n) {\n\
                if (n <= 1) return n;\n\
                return fib(n - 2) + fib(n - 1);\n\
            }\n\
            for (var i = 0; i < 10; i = i + 1) {\n\
                print fib(i);\n\
            }";

        assert_eq!(run(code), "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n");
    }

    #[test]
    fn return_skips_the_rest_of_the_body() {
        let code = "\
            fun getNumber() {\n\
                return 82;\n\
                print \"unreachable\";\n\
            }\n\
            print getNumber();";

        assert_eq!(run(code), "82\n");
    }

    #[test]
    fn function_without_return_yields_nil() {
        assert_eq!(run("fun noop() {} print noop();"), "nil\n");
    }

    #[test]
    fn first_class_functions() {
        assert_eq!(
            run("fun say(n) { print n; } var alias = say; alias(\"hi\");"),
            "hi\n"
        );
    }

    #[test]
    fn clock_is_a_native_function() {
        assert_eq!(run("print clock() > 0;"), "true\n");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Classes, instances, inheritance
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn fields_are_per_instance() {
        let code = "\
            class Box {}\n\
            var a = Box();\n\
            var b = Box();\n\
            a.value = 1;\n\
            b.value = 2;\n\
            print a.value;\n\
            print b.value;";

        assert_eq!(run(code), "1\n2\n");
    }

    #[test]
    fn methods_see_this() {
        let code = "\
            class Greeter {\n\
                greet() { print \"hello \" + this.name; }\n\
            }\n\
            var g = Greeter();\n\
            g.name = \"world\";\n\
            g.greet();";

        assert_eq!(run(code), "hello world\n");
    }

    #[test]
    fn bound_methods_remember_their_receiver() {
        let code = "\
            class Foo {\n\
                bar() { print this.x; }\n\
            }\n\
            var f = Foo();\n\
            f.x = 42;\n\
            var m = f.bar;\n\
            m();";

        assert_eq!(run(code), "42\n");
    }

    #[test]
    fn initializer_runs_at_construction() {
        let code = "\
            class Point {\n\
                init(x, y) { this.x = x; this.y = y; }\n\
            }\n\
            var p = Point(3, 4);\n\
            print p.x + p.y;";

        assert_eq!(run(code), "7\n");
    }

    #[test]
    fn initializer_always_returns_the_instance() {
        let code = "\
            class Foo {\n\
                init() { this.x = 1; return; }\n\
            }\n\
            var f = Foo();\n\
            print f.x;\n\
            print f.init() == f;";

        assert_eq!(run(code), "1\ntrue\n");
    }

    #[test]
    fn fields_shadow_methods() {
        let code = "\
            class Foo {\n\
                bar() { print \"method\"; }\n\
            }\n\
            var f = Foo();\n\
            fun replacement() { print \"field\"; }\n\
            f.bar = replacement;\n\
            f.bar();";

        assert_eq!(run(code), "field\n");
    }

    #[test]
    fn inherited_methods_dispatch_through_the_chain() {
        let code = "\
            class A { say() { print \"A\"; } }\n\
            class B < A {}\n\
            B().say();";

        assert_eq!(run(code), "A\n");
    }

    #[test]
    fn super_calls_the_superclass_method() {
        let code = "\
            class A { say() { print \"A\"; } }\n\
            class B < A { say() { super.say(); print \"B\"; } }\n\
            B().say();";

        assert_eq!(run(code), "A\nB\n");
    }

    #[test]
    fn super_skips_a_level_without_an_override() {
        let code = "\
            class A { m() { print \"A\"; } }\n\
            class B < A {}\n\
            class C < B { m() { super.m(); print \"C\"; } }\n\
            C().m();";

        assert_eq!(run(code), "A\nC\n");
    }

    #[test]
    fn class_call_arity_comes_from_init() {
        let code = "\
            class Pair { init(a, b) { this.sum = a + b; } }\n\
            print Pair(1, 2).sum;";

        assert_eq!(run(code), "3\n");
    }

    #[test]
    fn methods_can_mention_their_class() {
        let code = "\
            class Singleton {\n\
                make() { return Singleton(); }\n\
            }\n\
            print Singleton().make();";

        assert_eq!(run(code), "Singleton instance\n");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Runtime errors
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn calling_a_non_callable() {
        let (output, had_error, had_runtime_error) = run_with_flags("true();");

        assert_eq!(
            output,
            "RuntimeError: Can only call functions and classes.\n[line 1]\n"
        );
        assert!(!had_error);
        assert!(had_runtime_error);
    }

    #[test]
    fn arity_mismatch() {
        assert_eq!(
            run("fun f(a) {}\nf(1, 2);"),
            "RuntimeError: Expected 1 arguments but got 2.\n[line 2]\n"
        );
    }

    #[test]
    fn undefined_variable() {
        assert_eq!(
            run("print x;"),
            "RuntimeError: Undefined variable 'x'.\n[line 1]\n"
        );
    }

    #[test]
    fn undefined_assignment_target() {
        assert_eq!(
            run("x = 1;"),
            "RuntimeError: Undefined variable 'x'.\n[line 1]\n"
        );
    }

    #[test]
    fn operands_must_be_numbers() {
        assert_eq!(
            run("print \"a\" < \"b\";"),
            "RuntimeError: Operands must be numbers.\n[line 1]\n"
        );
        assert_eq!(
            run("print -\"a\";"),
            "RuntimeError: Operands must be numbers.\n[line 1]\n"
        );
    }

    #[test]
    fn plus_rejects_mixed_operands() {
        assert_eq!(
            run("print 1 + \"a\";"),
            "RuntimeError: Operands must be two numbers or two strings.\n[line 1]\n"
        );
    }

    #[test]
    fn properties_require_instances() {
        assert_eq!(
            run("var x = 1; print x.y;"),
            "RuntimeError: Only instances have properties.\n[line 1]\n"
        );
        assert_eq!(
            run("var x = 1; x.y = 2;"),
            "RuntimeError: Only instances have fields.\n[line 1]\n"
        );
    }

    #[test]
    fn undefined_property() {
        assert_eq!(
            run("class Foo {}\nprint Foo().missing;"),
            "RuntimeError: Undefined property 'missing'.\n[line 2]\n"
        );
    }

    #[test]
    fn undefined_super_method() {
        let code = "\
            class A {}\n\
            class B < A { m() { super.missing(); } }\n\
            B().m();";

        assert_eq!(
            run(code),
            "RuntimeError: Undefined property 'missing'.\n[line 2]\n"
        );
    }

    #[test]
    fn superclass_must_be_a_class() {
        assert_eq!(
            run("var NotAClass = 1;\nclass Sub < NotAClass {}"),
            "RuntimeError: Superclass must be a class.\n[line 2]\n"
        );
    }

    #[test]
    fn runtime_error_reports_the_offending_line() {
        assert_eq!(
            run("var a = 1;\nvar b = 2;\nprint a + c;"),
            "RuntimeError: Undefined variable 'c'.\n[line 3]\n"
        );
    }

    #[test]
    fn output_before_a_runtime_error_is_kept() {
        assert_eq!(
            run("print \"first\";\nboom();"),
            "first\nRuntimeError: Undefined variable 'boom'.\n[line 2]\n"
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // Driver behavior
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn globals_persist_across_runs_on_one_driver() {
        let mut buffer: Vec<u8> = Vec::new();
        {
            let mut lox = Lox::new(&mut buffer);
            lox.run(b"var a = 1;");
            lox.run(b"print a;");
        }

        let output = String::from_utf8(buffer).expect("output should be UTF-8");
        assert_eq!(output, "1\n");
    }

    #[test]
    fn repl_requires_the_stdout_sink() {
        let mut buffer: Vec<u8> = Vec::new();
        let code = {
            let mut lox = Lox::new(&mut buffer);
            lox.run_prompt()
        };

        assert_eq!(code, EX_USAGE);
        assert!(buffer.is_empty());
    }

    #[test]
    fn parse_errors_suppress_execution() {
        let (output, had_error, _) = run_with_flags("print \"ok\";\nvar 1 = 2;");

        assert_eq!(
            output,
            "[line 2] Error at '1': Expect variable name.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn lexical_errors_suppress_execution() {
        let (output, had_error, _) = run_with_flags("print 1;\n@");

        assert_eq!(output, "[line 2] Error: Unexpected character.\n");
        assert!(had_error);
    }
}
