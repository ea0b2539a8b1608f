use crate::error::{CalcError, Result};
use indexmap::IndexMap;
use std::f64::consts;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub value: f64,
    pub is_const: bool,
}

/// The live name table of a session, in declaration order.
///
/// Names are only ever added (`let`, `const`, `load`) or updated (`set`, `load`); there is no
/// way to remove a single name.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    scope: IndexMap<String, Variable>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scope: IndexMap::new(),
        }
    }

    /// An environment holding the built-in constants `pi` and `e`.
    pub fn with_constants() -> Self {
        let mut env = Environment::new();
        env.declare_or_overwrite("pi", consts::PI, true);
        env.declare_or_overwrite("e", consts::E, true);
        env
    }

    pub fn get(&self, key: &str) -> Result<f64> {
        match self.scope.get(key) {
            Some(var) => Ok(var.value),
            None => raise!(CalcError::Name, "undefined name {}", key),
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&Variable> {
        self.scope.get(key)
    }

    pub fn set(&mut self, key: &str, value: f64) -> Result<()> {
        let var = match self.scope.get_mut(key) {
            Some(var) => var,
            None => raise!(CalcError::Name, "undefined name {}", key),
        };

        if var.is_const {
            raise!(CalcError::Mutability, "cannot update constant {}", key);
        }

        var.value = value;
        Ok(())
    }

    pub fn is_declared(&self, key: &str) -> bool {
        self.scope.contains_key(key)
    }

    /// Declare a new name; fails if it already exists.
    pub fn declare_strict(&mut self, key: &str, value: f64, is_const: bool) -> Result<()> {
        if self.is_declared(key) {
            raise!(CalcError::Name, "{} declared twice", key);
        }

        self.scope.insert(key.into(), Variable { value, is_const });
        Ok(())
    }

    /// Insert or replace a name regardless of what was there, constants included.
    ///
    /// Only loading a saved environment goes through here. A replaced name keeps its original
    /// position in the iteration order.
    pub fn declare_or_overwrite(&mut self, key: &str, value: f64, is_const: bool) {
        self.scope.insert(key.into(), Variable { value, is_const });
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.scope.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.scope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scope.is_empty()
    }

    pub fn clear(&mut self) {
        self.scope.clear();
    }
}
