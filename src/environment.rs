use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::LoxError;
use crate::token::Token;
use crate::value::Value;

/// A lexical scope: a name-to-value map chained to the enclosing scope.
/// Closures and blocks share environments through `Rc<RefCell<_>>` handles,
/// so the chain forms a DAG rooted at the globals.
#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, LoxError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), LoxError> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Walk `depth` enclosing links up from `env`. The resolver guarantees
    /// the depth is valid for every recorded local.
    pub fn ancestor(env: &Rc<RefCell<Environment>>, depth: usize) -> Rc<RefCell<Environment>> {
        let mut current: Rc<RefCell<Environment>> = env.clone();

        for _ in 0..depth {
            let next: Rc<RefCell<Environment>> = current
                .borrow()
                .enclosing
                .clone()
                .expect("resolved depth exceeds the environment chain");
            current = next;
        }

        current
    }

    /// Read a resolved local directly from the scope `depth` levels up.
    pub fn get_at(env: &Rc<RefCell<Environment>>, depth: usize, name: &str) -> Option<Value> {
        Environment::ancestor(env, depth)
            .borrow()
            .values
            .get(name)
            .cloned()
    }

    /// Overwrite a resolved local in the scope `depth` levels up.
    pub fn assign_at(env: &Rc<RefCell<Environment>>, depth: usize, name: &str, value: Value) {
        Environment::ancestor(env, depth)
            .borrow_mut()
            .values
            .insert(name.to_string(), value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}
