//! Script component
//!
//! References a script resource plus the parameters handed to it when it is
//! attached. Executing scripts is up to the host application; the scene only
//! tracks attachment and reports detachment through
//! [`Scene::take_script_detach_events`](crate::scene::Scene::take_script_detach_events).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of a script parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptParam {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f32),
    /// Text
    String(String),
}

/// Script resource and its parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Script {
    /// Script resource path
    pub path: String,
    /// Named parameters, sorted by name
    pub params: BTreeMap<String, ScriptParam>,
}

impl Script {
    /// Script at `path` with no parameters
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: BTreeMap::new(),
        }
    }

    /// Builder pattern: add a parameter
    pub fn with_param(mut self, name: impl Into<String>, value: ScriptParam) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Set a parameter, returning the previous value
    pub fn set_param(&mut self, name: impl Into<String>, value: ScriptParam) -> Option<ScriptParam> {
        self.params.insert(name.into(), value)
    }

    /// Parameter by name
    pub fn param(&self, name: &str) -> Option<&ScriptParam> {
        self.params.get(name)
    }
}
