//! Lisp-prefix rendering of the AST, mainly for parser tests and debugging.

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::token::{Number, Token};

pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Block { statements } => {
                let mut s: String = "(block ".to_string();

                for statement in statements {
                    s.push_str(&self.print(statement));
                }
                s.push(')');

                s
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let mut s: String = format!("(class {}", name.lexeme);

                if let Some(Expr::Variable {
                    name: superclass_name,
                    ..
                }) = superclass
                {
                    s.push_str(&format!(" < {}", superclass_name.lexeme));
                }

                for method in methods {
                    s.push(' ');
                    s.push_str(&self.print_function(
                        &method.name.lexeme,
                        &method.params,
                        &method.body,
                    ));
                }
                s.push(')');

                s
            }

            Stmt::Expression { expression } => {
                format!("(; {})", self.print_expr(expression))
            }

            Stmt::Function { declaration } => self.print_function(
                &declaration.name.lexeme,
                &declaration.params,
                &declaration.body,
            ),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if-else {} {} {})",
                    self.print_expr(condition),
                    self.print(then_branch),
                    self.print(else_branch)
                ),

                None => format!(
                    "(if {} {})",
                    self.print_expr(condition),
                    self.print(then_branch)
                ),
            },

            Stmt::Print { expression } => {
                format!("(print {})", self.print_expr(expression))
            }

            Stmt::Return { value, .. } => match value {
                Some(expression) => format!("(return {})", self.print_expr(expression)),

                None => "(return)".to_string(),
            },

            Stmt::Var { name, initializer } => match initializer {
                Some(expression) => {
                    format!("(var {} = {})", name.lexeme, self.print_expr(expression))
                }

                None => format!("(var {})", name.lexeme),
            },

            Stmt::While { condition, body } => {
                format!(
                    "(while {} {})",
                    self.print_expr(condition),
                    self.print(body)
                )
            }
        }
    }

    fn print_function(&self, name: &str, params: &[Token], body: &[Stmt]) -> String {
        let mut s: String = format!("(fun {}(", name);

        let joined: Vec<&str> = params.iter().map(|param| param.lexeme.as_str()).collect();
        s.push_str(&joined.join(" "));
        s.push_str(") ");

        for statement in body {
            s.push_str(&self.print(statement));
        }
        s.push(')');

        s
    }

    pub fn print_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print_expr(value))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => {
                format!(
                    "({} {} {})",
                    operator.lexeme,
                    self.print_expr(left),
                    self.print_expr(right)
                )
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s: String = format!("(call {}", self.print_expr(callee));

                for argument in arguments {
                    s.push(' ');
                    s.push_str(&self.print_expr(argument));
                }
                s.push(')');

                s
            }

            Expr::Get { object, name } => {
                format!("(. {} {})", self.print_expr(object), name.lexeme)
            }

            Expr::Grouping { expression } => {
                format!("(group {})", self.print_expr(expression))
            }

            Expr::Literal { value } => match value {
                LiteralValue::Bool(b) => b.to_string(),

                LiteralValue::Nil => "nil".to_string(),

                LiteralValue::Number(Number::Int(n)) => n.to_string(),

                LiteralValue::Number(Number::Double(d)) => {
                    if d.fract() == 0.0 {
                        format!("{:.1}", d)
                    } else {
                        format!("{}", d)
                    }
                }

                LiteralValue::Str(s) => s.clone(),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                format!(
                    "(= {} {} {})",
                    self.print_expr(object),
                    name.lexeme,
                    self.print_expr(value)
                )
            }

            Expr::Super { method, .. } => {
                format!("(super {})", method.lexeme)
            }

            Expr::This { .. } => "this".to_string(),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print_expr(right))
            }

            Expr::Variable { name, .. } => name.lexeme.clone(),
        }
    }
}
