use std::{fmt, sync::Arc};

use crate::error::{Error, Result};

/// Bucket key. [`Topic::Any`] is the wildcard bucket; it cannot collide with any
/// notification name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Topic {
    Any,
    Named(Arc<str>),
}

impl Topic {
    /// Maps an optional name filter to a bucket key. An absent name is the wildcard;
    /// an empty one is rejected.
    pub(crate) fn from_filter(name: Option<&str>) -> Result<Self> {
        match name {
            None => Ok(Topic::Any),
            Some("") => Err(Error::MissingRequired("notification name")),
            Some(name) => Ok(Topic::Named(Arc::from(name))),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Any => write!(f, "*"),
            Topic::Named(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_filter_is_wildcard() {
        assert_eq!(Topic::from_filter(None), Ok(Topic::Any));
    }

    #[test]
    fn empty_filter_is_rejected() {
        assert_eq!(
            Topic::from_filter(Some("")),
            Err(Error::MissingRequired("notification name"))
        );
    }

    #[test]
    fn wildcard_never_equals_a_name() {
        // Given
        let named = Topic::from_filter(Some("*")).unwrap();

        // Then
        assert_ne!(named, Topic::Any);
        assert_eq!(named.to_string(), Topic::Any.to_string());
    }
}
