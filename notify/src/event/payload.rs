//! Immutable key/value payloads attached to events.

use std::{
    any::Any,
    collections::{HashMap, hash_map},
    fmt,
    sync::Arc,
};

use crate::error::{Error, Result};

/// An opaque payload value.
pub type Value = Arc<dyn Any + Send + Sync>;

/// A frozen string-keyed mapping carried by an [`Event`](crate::Event).
///
/// A payload is built once and only read afterwards. There is no way to obtain
/// mutable access, so every attempt to change one is rejected by the compiler:
///
/// ```compile_fail
/// let payload = rusty_notify::user_info!("key", 1u32).unwrap();
/// payload.insert("other".to_string(), std::sync::Arc::new(2u32));
/// ```
///
/// Cloning is cheap; clones share the same frozen map.
#[derive(Clone, Default)]
pub struct Payload {
    entries: Arc<HashMap<String, Value>>,
}

impl Payload {
    /// Returns an empty payload.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Freezes `entries` into a payload.
    pub fn from_map(entries: HashMap<String, Value>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Builds a payload from key/value pairs.
    ///
    /// Fails with [`Error::DuplicateKey`] as soon as a key repeats. No pairs yield an
    /// empty payload.
    pub fn from_pairs<K, I>(pairs: I) -> Result<Self>
    where
        K: ToString,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut entries = HashMap::new();
        for (key, value) in pairs {
            match entries.entry(key.to_string()) {
                hash_map::Entry::Occupied(occupied) => {
                    return Err(Error::DuplicateKey(occupied.key().clone()));
                }
                hash_map::Entry::Vacant(vacant) => {
                    vacant.insert(value);
                }
            }
        }
        Ok(Self::from_map(entries))
    }

    /// Returns the raw value for `key`.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns the value for `key` if it holds a `T`.
    pub fn get_as<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref::<T>()
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Payload").field("keys", &keys).finish()
    }
}

/// Wraps any shareable value as a payload [`Value`].
#[inline]
pub fn value<T: Any + Send + Sync>(value: T) -> Value {
    Arc::new(value)
}

/// Builds a [`Payload`] from an alternating `key, value, key, value, ...` list.
///
/// Keys go through [`ToString`]; values are wrapped with [`value()`]. Evaluates to
/// `Result<Payload>`, failing with [`Error::DuplicateKey`](crate::Error::DuplicateKey)
/// on a repeated key.
///
/// ```rust
/// use rusty_notify::user_info;
///
/// # fn main() -> rusty_notify::Result<()> {
/// let info = user_info!("user", "ada", "attempts", 3u32)?;
/// assert_eq!(info.get_as::<u32>("attempts"), Some(&3));
///
/// assert!(user_info!().unwrap().is_empty());
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! user_info {
    () => {
        $crate::Payload::from_pairs(::std::iter::empty::<(::std::string::String, $crate::Value)>())
    };
    ($($key:expr, $value:expr),+ $(,)?) => {
        $crate::Payload::from_pairs([
            $((::std::string::ToString::to_string(&$key), $crate::value($value))),+
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_info;

    #[test]
    fn empty_argument_list_yields_empty_payload() {
        // When
        let payload = user_info!().unwrap();

        // Then
        assert!(payload.is_empty());
        assert_eq!(payload.len(), 0);
    }

    #[test]
    fn alternating_arguments_become_entries() {
        // When
        let payload = user_info!("Key", "Value", 1, "int key", true, "boolean key").unwrap();

        // Then
        assert_eq!(payload.len(), 3);
        assert_eq!(payload.get_as::<&str>("Key"), Some(&"Value"));
        assert_eq!(payload.get_as::<&str>("1"), Some(&"int key"));
        assert_eq!(payload.get_as::<&str>("true"), Some(&"boolean key"));
    }

    #[test]
    fn repeated_key_is_rejected() {
        // When
        let result = user_info!("k", "v", "k", "v2");

        // Then
        assert_eq!(result.unwrap_err(), Error::DuplicateKey("k".into()));
    }

    #[test]
    fn keys_are_compared_after_stringification() {
        // When
        let result = user_info!(1, "int", "1", "string");

        // Then
        assert!(result.unwrap_err().is_duplicate_key());
    }

    #[test]
    fn get_as_wrong_type_is_none() {
        // Given
        let payload = user_info!("count", 3u32).unwrap();

        // Then
        assert!(payload.get("count").is_some());
        assert_eq!(payload.get_as::<u64>("count"), None);
        assert_eq!(payload.get_as::<u32>("missing"), None);
    }

    #[test]
    fn clones_share_the_frozen_map() {
        // Given
        let mut source = HashMap::new();
        source.insert("a".to_string(), value(1u8));
        let payload = Payload::from_map(source);

        // When
        let clone = payload.clone();

        // Then
        assert!(Arc::ptr_eq(&payload.entries, &clone.entries));
        assert_eq!(clone.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn debug_lists_sorted_keys() {
        // Given
        let payload = user_info!("b", 1, "a", 2).unwrap();

        // Then
        assert_eq!(format!("{payload:?}"), r#"Payload { keys: ["a", "b"] }"#);
    }
}
