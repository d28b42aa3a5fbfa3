//! Recoverable error conditions reported by `SlimDict` and its views.
//!
//! Structural corruption of the chain links is not represented here: it is
//! reported with a panic because the table cannot be trusted afterwards.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictError {
    /// `add` was called with a key that is already present.
    #[error("an entry with the same key already exists")]
    DuplicateKey,
    /// A keyed accessor that requires presence found no entry.
    #[error("the given key was not present in the dictionary")]
    KeyNotFound,
    /// A bulk copy target cannot hold every live element.
    #[error("destination too small: {required} elements required, {available} available")]
    DestinationTooSmall { required: usize, available: usize },
    /// The comparer cannot hash or compare the requested alternate key type.
    #[error("comparer does not support alternate key type `{key_type}`")]
    IncompatibleComparer { key_type: &'static str },
}

pub type Result<T, E = DictError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::DictError;

    #[test]
    fn messages_name_the_condition() {
        assert_eq!(
            DictError::DuplicateKey.to_string(),
            "an entry with the same key already exists"
        );
        let e = DictError::DestinationTooSmall {
            required: 3,
            available: 1,
        };
        assert_eq!(
            e.to_string(),
            "destination too small: 3 elements required, 1 available"
        );
        let e = DictError::IncompatibleComparer { key_type: "str" };
        assert!(e.to_string().contains("`str`"));
    }
}
