//! Cache Key Module
//!
//! Deterministic key derivation from an operation's identity and its call
//! arguments.

use std::fmt;

use serde::Serialize;

use crate::error::KeyError;

// == Cache Key ==
/// Deterministic identifier for one memoized call.
///
/// Derived from the wrapped operation's name, its ordered positional
/// arguments, and its named arguments. Two calls with the same operation and
/// the same argument representations always map to the same key; any
/// difference in the representations yields a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the canonical string form of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Key Builder ==
/// Builds a [`CacheKey`] from an operation name and its arguments.
///
/// Positional arguments are order-sensitive: the builder records them in the
/// order supplied. Named arguments are sorted by name when the key is
/// finalized, so supplying the same set in a different textual order produces
/// the same key.
///
/// # Example
/// ```
/// use ttl_memo::KeyBuilder;
///
/// let a = KeyBuilder::new("lap_times").arg(2024).kwarg("driver", "VER").build();
/// let b = KeyBuilder::new("lap_times").arg(2024).kwarg("driver", "VER").build();
/// assert_eq!(a, b);
/// ```
#[derive(Debug)]
pub struct KeyBuilder {
    operation: String,
    args: Vec<String>,
    kwargs: Vec<(String, String)>,
}

impl KeyBuilder {
    // == Constructor ==
    /// Creates a builder for the named operation.
    ///
    /// # Arguments
    /// * `operation` - Stable identifier of the wrapped operation
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            args: Vec::new(),
            kwargs: Vec::new(),
        }
    }

    // == Positional Arguments ==
    /// Appends a positional argument using its textual representation.
    pub fn arg<T: fmt::Display>(mut self, value: T) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// Appends a positional argument canonicalized through its JSON form.
    ///
    /// Fails with [`KeyError`] when the value has no JSON representation;
    /// the memoization layer responds by bypassing the cache for that call.
    pub fn arg_json<T: Serialize>(mut self, value: &T) -> Result<Self, KeyError> {
        self.args.push(serde_json::to_string(value)?);
        Ok(self)
    }

    // == Named Arguments ==
    /// Appends a named argument using its textual representation.
    ///
    /// Named arguments are order-independent: they are normalized by name
    /// when the key is built.
    pub fn kwarg<T: fmt::Display>(mut self, name: &str, value: T) -> Self {
        self.kwargs.push((name.to_string(), value.to_string()));
        self
    }

    /// Appends a named argument canonicalized through its JSON form.
    pub fn kwarg_json<T: Serialize>(mut self, name: &str, value: &T) -> Result<Self, KeyError> {
        self.kwargs.push((name.to_string(), serde_json::to_string(value)?));
        Ok(self)
    }

    // == Build ==
    /// Finalizes the key.
    ///
    /// Named arguments are sorted by name so that supply order never affects
    /// the result. Every component is escaped before joining, which keeps the
    /// encoding injective: distinct argument lists cannot collide on
    /// separator characters.
    pub fn build(mut self) -> CacheKey {
        self.kwargs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut key = String::new();
        push_escaped(&mut key, &self.operation);
        for arg in &self.args {
            key.push(':');
            push_escaped(&mut key, arg);
        }
        for (name, value) in &self.kwargs {
            key.push(':');
            push_escaped(&mut key, name);
            key.push('=');
            push_escaped(&mut key, value);
        }
        CacheKey(key)
    }
}

// == Utility Functions ==
/// Appends `component` to `out` with separator characters escaped.
fn push_escaped(out: &mut String, component: &str) {
    for ch in component.chars() {
        match ch {
            ':' | '=' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

// == Cache Args ==
/// Describes how an argument bundle contributes to a cache key.
///
/// Implemented for `()` and small tuples of `Display` types, which covers
/// common call shapes. Operations with richer signatures implement it on a
/// dedicated argument struct, using [`KeyBuilder::kwarg`] for fields whose
/// supply order should not matter.
pub trait CacheArgs {
    /// Writes this bundle's arguments into the key builder.
    fn write_key(&self, builder: KeyBuilder) -> Result<KeyBuilder, KeyError>;
}

impl CacheArgs for () {
    fn write_key(&self, builder: KeyBuilder) -> Result<KeyBuilder, KeyError> {
        Ok(builder)
    }
}

impl<A: fmt::Display> CacheArgs for (A,) {
    fn write_key(&self, builder: KeyBuilder) -> Result<KeyBuilder, KeyError> {
        Ok(builder.arg(&self.0))
    }
}

impl<A: fmt::Display, B: fmt::Display> CacheArgs for (A, B) {
    fn write_key(&self, builder: KeyBuilder) -> Result<KeyBuilder, KeyError> {
        Ok(builder.arg(&self.0).arg(&self.1))
    }
}

impl<A: fmt::Display, B: fmt::Display, C: fmt::Display> CacheArgs for (A, B, C) {
    fn write_key(&self, builder: KeyBuilder) -> Result<KeyBuilder, KeyError> {
        Ok(builder.arg(&self.0).arg(&self.1).arg(&self.2))
    }
}

impl<A: fmt::Display, B: fmt::Display, C: fmt::Display, D: fmt::Display> CacheArgs
    for (A, B, C, D)
{
    fn write_key(&self, builder: KeyBuilder) -> Result<KeyBuilder, KeyError> {
        Ok(builder.arg(&self.0).arg(&self.1).arg(&self.2).arg(&self.3))
    }
}
