use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::callable::{self, LoxClass, LoxFunction, LoxInstance};
use crate::environment::Environment;
use crate::error::LoxError;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Non-local exit from statement execution: either a `return` travelling up
/// to the nearest enclosing call, or a runtime error travelling to the
/// top-level executor. Both unwind through blocks, which restore their
/// environment either way.
#[derive(Debug)]
pub enum Interrupt {
    Return(Value),
    Error(LoxError),
}

impl From<LoxError> for Interrupt {
    fn from(error: LoxError) -> Self {
        Interrupt::Error(error)
    }
}

/// Tree-walking executor. Owns the globals chain root, the current
/// environment handle, and the resolver's binding-depth map; writes all
/// program output to the injected sink.
pub struct Interpreter<'a> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<usize, usize>,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        let globals: Rc<RefCell<Environment>> = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction(Rc::new(callable::clock())),
        );

        Interpreter {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// The program output sink. The driver routes diagnostics through the
    /// same sink.
    pub fn output(&mut self) -> &mut dyn Write {
        &mut *self.output
    }

    /// Record a resolved local: `name` in `expr_id` lives `depth` scopes up
    /// from the environment current at evaluation time. Called by the
    /// resolver; absence from the map means the name is global.
    pub fn note_local(&mut self, expr_id: usize, depth: usize) {
        debug!("Noting local binding: expr id {} at depth {}", expr_id, depth);

        self.locals.insert(expr_id, depth);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), LoxError> {
        info!("Interpreting {} statement(s)", statements.len());

        for statement in statements {
            match self.execute(statement) {
                Ok(()) => {}

                Err(Interrupt::Error(error)) => return Err(error),

                Err(Interrupt::Return(_)) => {
                    unreachable!("top-level 'return' is rejected by the resolver")
                }
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        match stmt {
            Stmt::Expression { expression } => {
                self.evaluate(expression)?;

                Ok(())
            }

            Stmt::Print { expression } => {
                let value: Value = self.evaluate(expression)?;

                writeln!(self.output, "{}", value).map_err(LoxError::from)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expression) => self.evaluate(expression)?,

                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block { statements } => {
                let inner: Environment = Environment::with_enclosing(self.environment.clone());

                self.execute_block(statements, Rc::new(RefCell::new(inner)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function { declaration } => {
                let function: LoxFunction =
                    LoxFunction::new(declaration.clone(), self.environment.clone(), false);

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),

            Stmt::Return { keyword: _, value } => {
                let value: Value = match value {
                    Some(expression) => self.evaluate(expression)?,

                    None => Value::Nil,
                };

                Err(Interrupt::Return(value))
            }
        }
    }

    /// Run `statements` with `environment` as the current scope, restoring
    /// the previous scope on every exit path (normal completion, runtime
    /// error, or return).
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<(), Interrupt> {
        let previous: Rc<RefCell<Environment>> =
            std::mem::replace(&mut self.environment, environment);

        let mut result: Result<(), Interrupt> = Ok(());
        for statement in statements {
            result = self.execute(statement);

            if result.is_err() {
                break;
            }
        }

        self.environment = previous;

        result
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<(), Interrupt> {
        // The name is bound to nil up front so method bodies can mention the
        // class before the class value exists.
        self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

        let superclass_value: Option<Rc<LoxClass>> = match superclass {
            Some(expression) => match self.evaluate(expression)? {
                Value::Class(class) => Some(class),

                _ => {
                    let superclass_name: &Token = match expression {
                        Expr::Variable { name, .. } => name,

                        _ => name,
                    };

                    return Err(Interrupt::Error(LoxError::runtime(
                        superclass_name,
                        "Superclass must be a class.",
                    )));
                }
            },

            None => None,
        };

        // Methods of a subclass close over an extra scope binding `super`.
        let previous: Rc<RefCell<Environment>> = self.environment.clone();
        if let Some(superclass) = &superclass_value {
            let mut inner: Environment = Environment::with_enclosing(self.environment.clone());
            inner.define("super", Value::Class(superclass.clone()));

            self.environment = Rc::new(RefCell::new(inner));
        }

        let mut method_table: HashMap<String, Rc<LoxFunction>> = HashMap::new();
        for method in methods {
            let is_initializer: bool = method.name.lexeme == "init";

            let function: LoxFunction =
                LoxFunction::new(method.clone(), self.environment.clone(), is_initializer);

            method_table.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class: Rc<LoxClass> = Rc::new(LoxClass::new(
            name.lexeme.clone(),
            superclass_value,
            method_table,
        ));

        self.environment = previous;

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(class))
            .map_err(Interrupt::from)?;

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, LoxError> {
        match expr {
            Expr::Literal { value } => Ok(Value::from(value)),

            Expr::Grouping { expression } => self.evaluate(expression),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_value: Value = self.evaluate(left)?;

                if operator.token_type == TokenType::OR {
                    if left_value.is_truthy() {
                        return Ok(left_value);
                    }
                } else if !left_value.is_truthy() {
                    return Ok(left_value);
                }

                self.evaluate(right)
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(depth) => {
                        Environment::assign_at(
                            &self.environment,
                            *depth,
                            &name.lexeme,
                            value.clone(),
                        );
                    }

                    None => {
                        self.globals.borrow_mut().assign(name, value.clone())?;
                    }
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_value: Value = self.evaluate(callee)?;

                let mut evaluated: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    evaluated.push(self.evaluate(argument)?);
                }

                self.call_value(callee_value, evaluated, paren)
            }

            Expr::Get { object, name } => {
                let object_value: Value = self.evaluate(object)?;

                match object_value {
                    Value::Instance(instance) => LoxInstance::get(&instance, name),

                    _ => Err(LoxError::runtime(name, "Only instances have properties.")),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object_value: Value = self.evaluate(object)?;

                let instance: Rc<RefCell<LoxInstance>> = match object_value {
                    Value::Instance(instance) => instance,

                    _ => return Err(LoxError::runtime(name, "Only instances have fields.")),
                };

                let value: Value = self.evaluate(value)?;

                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value, LoxError> {
        let operand: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::BANG => Ok(Value::Bool(!operand.is_truthy())),

            // Negation is subtraction from integer zero, which keeps the
            // integer/double discipline in one place: -i32::MIN overflows
            // the checked subtraction and falls back to a double.
            TokenType::MINUS => subtract(&Value::Int(0), operator, &operand),

            _ => unreachable!("parser produced a non-unary operator: {:?}", operator),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Value, LoxError> {
        let left_value: Value = self.evaluate(left)?;
        let right_value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::BANG_EQUAL => Ok(Value::Bool(left_value != right_value)),

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_value == right_value)),

            TokenType::GREATER => {
                let (a, b) = number_operands(&left_value, operator, &right_value)?;

                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(&left_value, operator, &right_value)?;

                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = number_operands(&left_value, operator, &right_value)?;

                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(&left_value, operator, &right_value)?;

                Ok(Value::Bool(a <= b))
            }

            TokenType::PLUS => add(&left_value, operator, &right_value),

            TokenType::MINUS => subtract(&left_value, operator, &right_value),

            TokenType::STAR => multiply(&left_value, operator, &right_value),

            TokenType::SLASH => divide(&left_value, operator, &right_value),

            _ => unreachable!("parser produced a non-binary operator: {:?}", operator),
        }
    }

    fn call_value(
        &mut self,
        callee: Value,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, LoxError> {
        let arity: usize = match &callee {
            Value::Function(function) => function.arity(),

            Value::Class(class) => class.arity(),

            Value::NativeFunction(native) => native.arity,

            _ => {
                return Err(LoxError::runtime(
                    paren,
                    "Can only call functions and classes.",
                ))
            }
        };

        if arguments.len() != arity {
            return Err(LoxError::runtime(
                paren,
                format!("Expected {} arguments but got {}.", arity, arguments.len()),
            ));
        }

        match callee {
            Value::Function(function) => function.call(self, arguments),

            Value::Class(class) => class.call(self, arguments),

            Value::NativeFunction(native) => {
                (native.func)(&arguments).map_err(|msg| LoxError::runtime(paren, msg))
            }

            _ => unreachable!("arity was computed for a non-callable"),
        }
    }

    fn evaluate_super(
        &mut self,
        id: usize,
        keyword: &Token,
        method: &Token,
    ) -> Result<Value, LoxError> {
        let depth: usize = *self
            .locals
            .get(&id)
            .expect("'super' occurrences are always resolved as locals");

        let superclass: Rc<LoxClass> =
            match Environment::get_at(&self.environment, depth, "super") {
                Some(Value::Class(class)) => class,

                _ => {
                    return Err(LoxError::runtime(
                        keyword,
                        "Undefined variable 'super'.",
                    ))
                }
            };

        // The implicit `this` scope sits directly inside the `super` scope.
        let instance: Rc<RefCell<LoxInstance>> =
            match Environment::get_at(&self.environment, depth - 1, "this") {
                Some(Value::Instance(instance)) => instance,

                _ => {
                    return Err(LoxError::runtime(
                        keyword,
                        "Undefined variable 'this'.",
                    ))
                }
            };

        let method_fn: Rc<LoxFunction> =
            superclass.find_method(&method.lexeme).ok_or_else(|| {
                LoxError::runtime(
                    method,
                    format!("Undefined property '{}'.", method.lexeme),
                )
            })?;

        Ok(Value::Function(Rc::new(method_fn.bind(&instance))))
    }

    fn look_up_variable(&self, id: usize, name: &Token) -> Result<Value, LoxError> {
        match self.locals.get(&id) {
            Some(depth) => Environment::get_at(&self.environment, *depth, &name.lexeme)
                .ok_or_else(|| {
                    LoxError::runtime(
                        name,
                        format!("Undefined variable '{}'.", name.lexeme),
                    )
                }),

            None => self.globals.borrow().get(name),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Numeric operations
// ─────────────────────────────────────────────────────────────────────────

fn number_operands(
    left: &Value,
    operator: &Token,
    right: &Value,
) -> Result<(f64, f64), LoxError> {
    match (left.as_double(), right.as_double()) {
        (Some(a), Some(b)) => Ok((a, b)),

        _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
    }
}

/// `+` concatenates two strings or adds two numbers; an exact 32-bit result
/// stays an integer, anything else is a double.
fn add(left: &Value, operator: &Token, right: &Value) -> Result<Value, LoxError> {
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return Ok(Value::Str(format!("{}{}", a, b)));
    }

    let (a, b) = match (left.as_double(), right.as_double()) {
        (Some(a), Some(b)) => (a, b),

        _ => {
            return Err(LoxError::runtime(
                operator,
                "Operands must be two numbers or two strings.",
            ))
        }
    };

    if let (Some(x), Some(y)) = (left.as_int(), right.as_int()) {
        if let Some(result) = x.checked_add(y) {
            return Ok(Value::Int(result));
        }
    }

    Ok(Value::Double(a + b))
}

fn subtract(left: &Value, operator: &Token, right: &Value) -> Result<Value, LoxError> {
    let (a, b) = number_operands(left, operator, right)?;

    if let (Some(x), Some(y)) = (left.as_int(), right.as_int()) {
        if let Some(result) = x.checked_sub(y) {
            return Ok(Value::Int(result));
        }
    }

    Ok(Value::Double(a - b))
}

fn multiply(left: &Value, operator: &Token, right: &Value) -> Result<Value, LoxError> {
    let (a, b) = number_operands(left, operator, right)?;

    if let (Some(x), Some(y)) = (left.as_int(), right.as_int()) {
        if let Some(result) = x.checked_mul(y) {
            return Ok(Value::Int(result));
        }
    }

    Ok(Value::Double(a * b))
}

/// Integer division truncates toward zero. Division by integer zero and
/// `i32::MIN / -1` fail the checked division and fall back to the IEEE
/// double result.
fn divide(left: &Value, operator: &Token, right: &Value) -> Result<Value, LoxError> {
    let (a, b) = number_operands(left, operator, right)?;

    if let (Some(x), Some(y)) = (left.as_int(), right.as_int()) {
        if let Some(result) = x.checked_div(y) {
            return Ok(Value::Int(result));
        }
    }

    Ok(Value::Double(a / b))
}
