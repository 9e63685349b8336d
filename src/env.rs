//! @ai:module:intent Layered process environment with set and prefix semantics
//! @ai:module:layer domain
//! @ai:module:public_api Env, EnvOp
//! @ai:module:stateless true

use std::fmt;

/// @ai:intent One named transformation applied on top of the base environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvOp {
    /// Replace (or add) `key` with `value`.
    Set { key: String, value: String },
    /// Prepend `prefix` to the current value of `key`, or set it if absent.
    Prefix { key: String, prefix: String },
}

/// @ai:intent Immutable environment: a base snapshot plus ordered layers
/// @ai:effects pure
///
/// Mutators consume `self` and return a new value, so a caller's environment
/// is never changed in place by a derived one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    base: Vec<(String, String)>,
    layers: Vec<EnvOp>,
}

impl Env {
    /// @ai:intent Create an environment from explicit key/value pairs
    /// @ai:effects pure
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            base: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            layers: Vec::new(),
        }
    }

    /// @ai:intent Snapshot the current process environment
    /// @ai:effects env
    pub fn inherit() -> Self {
        Self::new(std::env::vars())
    }

    /// @ai:intent Layer a `key=value` assignment
    /// @ai:effects pure
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.layers.push(EnvOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// @ai:intent Layer a prefix onto an existing variable
    /// @ai:effects pure
    pub fn prefix(mut self, key: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.layers.push(EnvOp::Prefix {
            key: key.into(),
            prefix: prefix.into(),
        });
        self
    }

    /// @ai:intent The layers applied on top of the base, in order
    /// @ai:effects pure
    pub fn layers(&self) -> &[EnvOp] {
        &self.layers
    }

    /// @ai:intent Apply every layer in order and return the flat variable list
    /// @ai:post keys are unique, first-seen order is kept
    /// @ai:effects pure
    pub fn collapse(&self) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = Vec::with_capacity(self.base.len());

        for (key, value) in &self.base {
            upsert(&mut vars, key, value.clone());
        }

        for op in &self.layers {
            match op {
                EnvOp::Set { key, value } => upsert(&mut vars, key, value.clone()),
                EnvOp::Prefix { key, prefix } => {
                    let current = lookup(&vars, key).unwrap_or_default().to_string();
                    upsert(&mut vars, key, format!("{prefix}{current}"));
                }
            }
        }

        vars
    }

    /// @ai:intent Resolve a single variable after all layers
    /// @ai:effects pure
    pub fn get(&self, key: &str) -> Option<String> {
        lookup(&self.collapse(), key).map(str::to_string)
    }
}

fn lookup<'a>(vars: &'a [(String, String)], key: &str) -> Option<&'a str> {
    vars.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn upsert(vars: &mut Vec<(String, String)>, key: &str, value: String) {
    match vars.iter_mut().find(|(k, _)| k == key) {
        Some(slot) => slot.1 = value,
        None => vars.push((key.to_string(), value)),
    }
}

impl fmt::Display for EnvOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvOp::Set { key, value } => write!(f, "{key}={value}"),
            EnvOp::Prefix { key, prefix } => write!(f, "{key}={prefix}${key}"),
        }
    }
}
