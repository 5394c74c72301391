// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named value coercions and validation predicates for mapping rules.
//!
//! Both registries start with built-ins and accept new entries at runtime.

use serde_json::{Number, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::payload::json_type;

pub type TransformFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;
pub type ValidatorFn = Arc<dyn Fn(Option<&Value>) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
pub struct TransformRegistry(HashMap<String, TransformFn>);

impl TransformRegistry {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("number", to_number);
        registry.register("integer", to_integer);
        registry.register("string", to_string);
        registry.register("array", to_array);
        registry.register("boolean", to_boolean);
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, transform: F)
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.0.insert(name.into(), Arc::new(transform));
    }

    pub fn get(&self, name: &str) -> Option<&TransformFn> {
        self.0.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.names())
            .finish()
    }
}

#[derive(Clone)]
pub struct ValidatorRegistry(HashMap<String, ValidatorFn>);

impl ValidatorRegistry {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("required", required);
        registry.register("number", |v| expect_type(v, "number"));
        registry.register("string", |v| expect_type(v, "string"));
        registry.register("array", |v| expect_type(v, "array"));
        registry.register("object", |v| expect_type(v, "object"));
        registry.register("non_empty", non_empty);
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, validator: F)
    where
        F: Fn(Option<&Value>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.0.insert(name.into(), Arc::new(validator));
    }

    pub fn get(&self, name: &str) -> Option<&ValidatorFn> {
        self.0.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.names())
            .finish()
    }
}

fn to_number(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::Bool(b) => Ok(Value::from(u8::from(*b))),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::from(i));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("'{}' is not numeric", s))
        }
        other => Err(format!("cannot convert {} to number", json_type(other))),
    }
}

fn to_integer(value: &Value) -> Result<Value, String> {
    match to_number(value)? {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::Number(n)),
        Value::Number(n) => n
            .as_f64()
            .map(|f| Value::from(f.trunc() as i64))
            .ok_or_else(|| format!("{} is not representable as an integer", n)),
        other => Err(format!("cannot convert {} to integer", json_type(&other))),
    }
}

fn to_string(value: &Value) -> Result<Value, String> {
    Ok(match value {
        Value::String(_) => value.clone(),
        Value::Null => Value::String(String::new()),
        other => Value::String(other.to_string()),
    })
}

fn to_array(value: &Value) -> Result<Value, String> {
    Ok(match value {
        Value::Array(_) => value.clone(),
        Value::Null => Value::Array(Vec::new()),
        other => Value::Array(vec![other.clone()]),
    })
}

fn to_boolean(value: &Value) -> Result<Value, String> {
    Ok(Value::Bool(match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !(s.is_empty() || s == "false" || s == "0"),
        Value::Array(_) | Value::Object(_) => true,
    }))
}

fn required(value: Option<&Value>) -> Result<(), String> {
    match value {
        None | Some(Value::Null) => Err("value is required".to_string()),
        Some(_) => Ok(()),
    }
}

fn expect_type(value: Option<&Value>, expected: &str) -> Result<(), String> {
    match value {
        Some(v) if json_type(v) == expected => Ok(()),
        Some(v) => Err(format!("expected {}, got {}", expected, json_type(v))),
        None => Err(format!("expected {}, value is missing", expected)),
    }
}

fn non_empty(value: Option<&Value>) -> Result<(), String> {
    let empty = match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    };
    if empty {
        Err("value is empty".to_string())
    } else {
        Ok(())
    }
}
