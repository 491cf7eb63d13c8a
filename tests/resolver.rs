#[cfg(test)]
mod resolver_tests {
    use tree_lox as lox;

    use lox::lox::Lox;

    /// Run a program and capture (sink contents, static-error flag,
    /// runtime-error flag).
    fn run(code: &str) -> (String, bool, bool) {
        let mut buffer: Vec<u8> = Vec::new();
        let (had_error, had_runtime_error) = {
            let mut lox = Lox::new(&mut buffer);
            lox.run(code.as_bytes());
            (lox.had_error(), lox.had_runtime_error())
        };

        let output = String::from_utf8(buffer).expect("output should be UTF-8");
        (output, had_error, had_runtime_error)
    }

    #[test]
    fn reading_a_local_in_its_own_initializer() {
        let (output, had_error, _) = run("{ var a = a; }");

        assert_eq!(
            output,
            "[line 1] Error at 'a': Can't read local variable in its own initializer.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn global_self_initializer_is_not_a_static_error() {
        // At global scope the two-step declare/define protocol does not
        // apply; the read happens at runtime and finds nothing.
        let (output, had_error, had_runtime_error) = run("var a = a;");

        assert_eq!(output, "RuntimeError: Undefined variable 'a'.\n[line 1]\n");
        assert!(!had_error);
        assert!(had_runtime_error);
    }

    #[test]
    fn class_cannot_inherit_from_itself() {
        let (output, had_error, _) = run("class Foo < Foo {}");

        assert_eq!(
            output,
            "[line 1] Error at 'Foo': A class can't inherit from itself.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn redeclaration_in_the_same_scope() {
        let (output, had_error, _) = run("fun bad() { var a = 1; var a = 2; }");

        assert_eq!(
            output,
            "[line 1] Error at 'a': Already a variable with this name in this scope.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn global_redeclaration_is_allowed() {
        let (output, had_error, _) = run("var a = 1; var a = 2; print a;");

        assert_eq!(output, "2\n");
        assert!(!had_error);
    }

    #[test]
    fn return_outside_a_function() {
        let (output, had_error, _) = run("return 1;");

        assert_eq!(
            output,
            "[line 1] Error at 'return': Can't return from top-level code.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn returning_a_value_from_an_initializer() {
        let (output, had_error, _) = run("class Foo { init() { return 1; } }");

        assert_eq!(
            output,
            "[line 1] Error at 'return': Can't return a value from an initializer.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn bare_return_in_an_initializer_is_allowed() {
        let (_, had_error, had_runtime_error) =
            run("class Foo { init() { return; } } Foo();");

        assert!(!had_error);
        assert!(!had_runtime_error);
    }

    #[test]
    fn this_outside_a_class() {
        let (output, had_error, _) = run("print this;");

        assert_eq!(
            output,
            "[line 1] Error at 'this': Can't use 'this' outside of a class.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn super_outside_a_class() {
        let (output, had_error, _) = run("fun f() { super.g(); }");

        assert_eq!(
            output,
            "[line 1] Error at 'super': Can't use 'super' outside of a class.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn super_in_a_class_without_a_superclass() {
        let (output, had_error, _) = run("class Foo { f() { super.f(); } }");

        assert_eq!(
            output,
            "[line 1] Error at 'super': Can't use 'super' in a class with no superclass.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn resolution_errors_suppress_execution() {
        let (output, had_error, _) = run("print \"before\";\nreturn 1;");

        // Nothing executes; only the diagnostic reaches the sink.
        assert_eq!(
            output,
            "[line 2] Error at 'return': Can't return from top-level code.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn resolver_reports_multiple_errors_in_one_pass() {
        let (output, had_error, _) = run("return 1;\nprint this;");

        assert_eq!(
            output,
            "[line 1] Error at 'return': Can't return from top-level code.\n\
             [line 2] Error at 'this': Can't use 'this' outside of a class.\n"
        );
        assert!(had_error);
    }

    #[test]
    fn shadowing_in_an_inner_scope_is_legal() {
        let (output, had_error, _) =
            run("var a = 1; { var a = 2; print a; } print a;");

        assert_eq!(output, "2\n1\n");
        assert!(!had_error);
    }
}
