//! Runtime callables: user functions, classes, instances, and natives.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::error::LoxError;
use crate::interpreter::{Interpreter, Interrupt};
use crate::token::Token;
use crate::value::Value;

/// A user-defined function: a declaration paired with the environment that
/// was current when the declaration executed.
#[derive(Debug)]
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        declaration: Rc<FunctionDecl>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// A copy of this function whose closure is extended with one scope
    /// binding `this` to the receiver.
    pub fn bind(&self, instance: &Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let mut environment: Environment = Environment::with_enclosing(self.closure.clone());
        environment.define("this", Value::Instance(instance.clone()));

        LoxFunction {
            declaration: self.declaration.clone(),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }

    pub fn call(
        &self,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<Value>,
    ) -> Result<Value, LoxError> {
        debug!("Calling <fn {}> with {} args", self.name(), arguments.len());

        let mut environment: Environment = Environment::with_enclosing(self.closure.clone());
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        let result: Result<(), Interrupt> = interpreter
            .execute_block(&self.declaration.body, Rc::new(RefCell::new(environment)));

        match result {
            Ok(()) => {
                if self.is_initializer {
                    Ok(self.bound_this())
                } else {
                    Ok(Value::Nil)
                }
            }

            Err(Interrupt::Return(value)) => {
                // An initializer ignores any return value and yields the
                // instance under construction.
                if self.is_initializer {
                    Ok(self.bound_this())
                } else {
                    Ok(value)
                }
            }

            Err(Interrupt::Error(error)) => Err(error),
        }
    }

    fn bound_this(&self) -> Value {
        Environment::get_at(&self.closure, 0, "this")
            .expect("an initializer's closure always binds 'this'")
    }
}

/// A class: a method table, an optional superclass, and a name. Calling the
/// class constructs an instance.
#[derive(Debug)]
pub struct LoxClass {
    pub name: String,
    superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        LoxClass {
            name,
            superclass,
            methods,
        }
    }

    /// Look up a method on this class or, failing that, up the superclass
    /// chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        if let Some(superclass) = &self.superclass {
            return superclass.find_method(name);
        }

        None
    }

    /// A class's arity is its initializer's arity, or zero without one.
    pub fn arity(&self) -> usize {
        match self.find_method("init") {
            Some(initializer) => initializer.arity(),

            None => 0,
        }
    }

    pub fn call(
        self: &Rc<Self>,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<Value>,
    ) -> Result<Value, LoxError> {
        debug!("Constructing instance of {}", self.name);

        let instance: Rc<RefCell<LoxInstance>> =
            Rc::new(RefCell::new(LoxInstance::new(self.clone())));

        if let Some(initializer) = self.find_method("init") {
            initializer.bind(&instance).call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

/// An instance: a reference to its class plus a dynamic field map. Methods
/// live on the class; fields shadow methods on lookup.
#[derive(Debug)]
pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        LoxInstance {
            class,
            fields: HashMap::new(),
        }
    }

    /// Property lookup: fields first, then methods bound to the receiver.
    pub fn get(instance: &Rc<RefCell<LoxInstance>>, name: &Token) -> Result<Value, LoxError> {
        if let Some(value) = instance.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        let method: Option<Rc<LoxFunction>> = instance.borrow().class.find_method(&name.lexeme);
        if let Some(method) = method {
            return Ok(Value::Function(Rc::new(method.bind(instance))));
        }

        Err(LoxError::runtime(
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

/// A function provided by the host rather than by Lox source.
#[derive(Debug)]
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: fn(&[Value]) -> Result<Value, String>,
}

fn clock_native(_args: &[Value]) -> Result<Value, String> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Clock error: {}", e))?
        .as_secs_f64();

    Ok(Value::Double(timestamp))
}

/// `clock()`: seconds since the epoch as a double.
pub fn clock() -> NativeFunction {
    NativeFunction {
        name: "clock".to_string(),
        arity: 0,
        func: clock_native,
    }
}
