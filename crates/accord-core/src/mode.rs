//! Notification dispatch modes

/// How settlement notifications are delivered to registered wrappers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dispatch {
    /// Run wrappers on the current call stack, in registration order
    Immediate,
    /// Defer wrappers to the dispatch queue, strictly after the currently
    /// executing synchronous code
    #[default]
    Deferred,
}

impl Dispatch {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Dispatch::Deferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_deferred() {
        assert!(Dispatch::default().is_deferred());
        assert!(!Dispatch::Immediate.is_deferred());
    }
}
