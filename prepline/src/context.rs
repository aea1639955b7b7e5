//! The shared parameter store threaded through every stage.

use crate::errors::DuplicateParamError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// A string-keyed bag of heterogeneous parameters.
///
/// One bag is owned per pipeline and handed to each stage in turn as
/// `&mut`. Any stage may read or write any key, including keys it did not
/// create; only [`ParamBag::merge_new`] checks for collisions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamBag {
    data: HashMap<String, Value>,
}

impl ParamBag {
    /// Creates a new empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bag from an existing mapping.
    #[must_use]
    pub fn from_map(data: HashMap<String, Value>) -> Self {
        Self { data }
    }

    /// Gets a value from the bag.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Gets a string value from the bag.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Gets a value deserialized into `T`, or `None` if the key is absent
    /// or the value has a different shape.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Sets a value in the bag, overwriting any existing value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    /// Returns a shallow copy of all entries.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.data.clone()
    }

    /// Merges `extra` into the bag, rejecting the whole merge if any
    /// incoming key already exists.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateParamError` naming the first colliding key. No
    /// key from `extra` is merged in that case.
    pub fn merge_new(&mut self, extra: HashMap<String, Value>) -> Result<(), DuplicateParamError> {
        for key in extra.keys() {
            if self.data.contains_key(key) {
                return Err(DuplicateParamError::new(key));
            }
        }
        self.data.extend(extra);
        Ok(())
    }
}
