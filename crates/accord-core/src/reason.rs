//! Normalized rejection reasons
//!
//! Every failure that reaches a settlement - an initializer failure, a
//! continuation failure, or an upstream rejection - is normalized to a
//! single [`Reason`] value before it is stored as the settlement's result.
//! Normalization keeps a human-readable description for every origin
//! without losing the original error for programmatic inspection.

use std::error::Error;
use std::sync::Arc;

/// Normalized rejection reason stored as a settlement's result
#[derive(Clone, Debug, thiserror::Error)]
pub enum Reason {
    /// Plain string reason
    #[error("{0}")]
    Message(String),

    /// Externally-sourced error descriptor (description plus origin URI)
    #[error("{desc} : {uri}")]
    Descriptor { desc: String, uri: String },

    /// Structured error, retained for inspection
    #[error(transparent)]
    Source(Arc<dyn Error + Send + Sync>),

    /// Ordered per-input reasons collected when every input of a
    /// combinator rejected
    #[error("all inputs rejected")]
    Aggregate(Vec<Reason>),
}

impl Reason {
    /// Wrap a structured error, keeping it for programmatic inspection
    pub fn from_error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Reason::Source(Arc::new(err))
    }

    /// Build a bridge-style error descriptor
    pub fn descriptor(desc: impl Into<String>, uri: impl Into<String>) -> Self {
        Reason::Descriptor {
            desc: desc.into(),
            uri: uri.into(),
        }
    }

    /// Human-readable description of the reason, whatever its origin
    pub fn description(&self) -> String {
        match self {
            Reason::Message(msg) => msg.clone(),
            Reason::Descriptor { desc, uri } => format!("{desc} : {uri}"),
            Reason::Source(err) => err.to_string(),
            Reason::Aggregate(reasons) => {
                let inner: Vec<String> = reasons.iter().map(Reason::description).collect();
                format!("all inputs rejected: {}", inner.join("; "))
            }
        }
    }

    /// Ordered per-input reasons, when this reason is an aggregate
    pub fn reasons(&self) -> Option<&[Reason]> {
        match self {
            Reason::Aggregate(reasons) => Some(reasons),
            _ => None,
        }
    }

    /// The wrapped error, when this reason carries one
    pub fn source_error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            Reason::Source(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<String> for Reason {
    fn from(msg: String) -> Self {
        Reason::Message(msg)
    }
}

impl From<&str> for Reason {
    fn from(msg: &str) -> Self {
        Reason::Message(msg.to_owned())
    }
}

/// Result type for operations that fail with a normalized reason
pub type SettleResult<T> = Result<T, Reason>;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, thiserror::Error)]
    #[error("call timed out after {0}ms")]
    struct TimeoutError(u64);

    #[test]
    fn test_message_description() {
        let reason = Reason::from("no such object");
        assert_eq!(reason.description(), "no such object");
        assert_eq!(reason.to_string(), "no such object");
    }

    #[test]
    fn test_descriptor_description() {
        let reason = Reason::descriptor("method failed", "bridge://call");
        assert_eq!(reason.description(), "method failed : bridge://call");
    }

    #[test]
    fn test_source_keeps_original_error() {
        let reason = Reason::from_error(TimeoutError(250));
        assert_eq!(reason.description(), "call timed out after 250ms");

        let original = reason
            .source_error()
            .and_then(|err| err.downcast_ref::<TimeoutError>());
        assert!(matches!(original, Some(TimeoutError(250))));
    }

    #[test]
    fn test_aggregate_orders_reasons() {
        let reason = Reason::Aggregate(vec![Reason::from("a"), Reason::from("b")]);
        let inner = reason.reasons().map(<[Reason]>::to_vec).unwrap_or_default();
        assert_eq!(inner.len(), 2);
        assert_eq!(inner[0].description(), "a");
        assert_eq!(inner[1].description(), "b");
        assert_eq!(reason.description(), "all inputs rejected: a; b");
    }

    proptest! {
        #[test]
        fn prop_message_description_roundtrips(msg in ".*") {
            let reason = Reason::from(msg.clone());
            prop_assert_eq!(reason.description(), msg);
        }

        #[test]
        fn prop_descriptor_keeps_both_parts(desc in "[a-z ]{1,20}", uri in "[a-z:/]{1,20}") {
            let reason = Reason::descriptor(desc.clone(), uri.clone());
            let text = reason.description();
            prop_assert!(text.contains(&desc));
            prop_assert!(text.contains(&uri));
        }
    }
}
