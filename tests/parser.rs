#[cfg(test)]
mod parser_tests {
    use tree_lox as lox;

    use lox::ast::Stmt;
    use lox::ast_printer::AstPrinter;
    use lox::error::LoxError;
    use lox::parser::Parser;
    use lox::scanner::Scanner;

    fn parse(source: &str) -> (Vec<Stmt>, Vec<LoxError>) {
        let tokens = Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .expect("test sources scan cleanly");

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();
        let errors = parser.take_errors();

        (statements, errors)
    }

    fn print_program(source: &str) -> String {
        let (statements, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);

        let printer = AstPrinter;
        statements
            .iter()
            .map(|statement| printer.print(statement))
            .collect::<Vec<_>>()
            .join("")
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(print_program("print 1 + 2 * 3;"), "(print (+ 1 (* 2 3)))");
    }

    #[test]
    fn grouping_overrides_precedence() {
        assert_eq!(
            print_program("print (1 + 2) * 3;"),
            "(print (* (group (+ 1 2)) 3))"
        );
    }

    #[test]
    fn comparison_and_equality_chain_left() {
        assert_eq!(
            print_program("print 1 < 2 == true;"),
            "(print (== (< 1 2) true))"
        );
    }

    #[test]
    fn unary_nests() {
        assert_eq!(print_program("print !!x;"), "(print (! (! x)))");
        assert_eq!(print_program("print - x;"), "(print (- x))");
    }

    #[test]
    fn assignment_reinterprets_the_left_side() {
        assert_eq!(print_program("a = b = 1;"), "(; (= a (= b 1)))");
        assert_eq!(print_program("a.b = 2;"), "(; (= a b 2))");
    }

    #[test]
    fn invalid_assignment_target_is_reported_without_unwinding() {
        let (statements, errors) = parse("a + b = 1;");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error at '=': Invalid assignment target."
        );
        // The statement list still carries the parsed expression.
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn call_and_property_chains() {
        assert_eq!(
            print_program("f(1)(2);"),
            "(; (call (call f 1) 2))"
        );
        assert_eq!(
            print_program("print a.b.c;"),
            "(print (. (. a b) c))"
        );
        assert_eq!(
            print_program("obj.method(1, 2);"),
            "(; (call (. obj method) 1 2))"
        );
    }

    #[test]
    fn logical_operators_nest_by_precedence() {
        assert_eq!(
            print_program("print a or b and c;"),
            "(print (or a (and b c)))"
        );
    }

    #[test]
    fn for_desugars_to_while() {
        assert_eq!(
            print_program("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i = 0)(while (< i 3) (block (print i)(; (= i (+ i 1))))))"
        );
    }

    #[test]
    fn for_without_clauses_loops_on_true() {
        assert_eq!(
            print_program("for (;;) print 1;"),
            "(while true (print 1))"
        );
    }

    #[test]
    fn if_else_attaches_to_the_nearest_if() {
        assert_eq!(
            print_program("if (a) if (b) print 1; else print 2;"),
            "(if a (if-else b (print 1) (print 2)))"
        );
    }

    #[test]
    fn function_and_return() {
        assert_eq!(
            print_program("fun add(a, b) { return a + b; }"),
            "(fun add(a b) (return (+ a b)))"
        );
        assert_eq!(print_program("fun noop() { return; }"), "(fun noop() (return))");
    }

    #[test]
    fn class_with_superclass_and_methods() {
        assert_eq!(
            print_program("class B < A { say() { print \"B\"; } }"),
            "(class B < A (fun say() (print B)))"
        );
    }

    #[test]
    fn super_and_this_expressions() {
        assert_eq!(
            print_program("class B < A { say() { super.say(); print this; } }"),
            "(class B < A (fun say() (; (call (super say)))(print this)))"
        );
    }

    #[test]
    fn parser_recovers_and_reports_multiple_errors() {
        let (statements, errors) = parse("var 1 = 2;\nprint;\nvar ok = 3;");

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error at '1': Expect variable name."
        );
        assert_eq!(
            errors[1].to_string(),
            "[line 2] Error at ';': Expect expression."
        );

        // The declaration after the bad ones still parses.
        assert_eq!(statements.len(), 1);
        let printer = AstPrinter;
        assert_eq!(printer.print(&statements[0]), "(var ok = 3)");
    }

    #[test]
    fn error_at_end_of_input() {
        let (_, errors) = parse("print 1");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "[line 1] Error at end: Expect ';' after value."
        );
    }

    #[test]
    fn printing_is_deterministic() {
        let source = "fun twice(x) { return x * 2; } print twice(21);";

        assert_eq!(print_program(source), print_program(source));
    }
}
