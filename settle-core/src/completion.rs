//! Continuation outcomes.

use crate::deferred::Deferred;

/// What a continuation produced for the chained deferred.
///
/// `Value` fulfills the child with an ordinary return value. `Chain` makes
/// the child adopt the eventual state of another deferred (the flattening
/// rule). `Fault` is the typed equivalent of throwing: the child rejects
/// with the fault.
pub enum Completion<T, E> {
    /// Ordinary return value; the child fulfills with it.
    Value(T),
    /// The child adopts this deferred's eventual state.
    Chain(Deferred<T, E>),
    /// The continuation failed; the child rejects with this reason.
    Fault(E),
}

impl<T, E> Completion<T, E> {
    /// Complete with a plain value.
    pub fn value(value: T) -> Self {
        Completion::Value(value)
    }

    /// Complete by adopting another deferred operation.
    pub fn chain(deferred: Deferred<T, E>) -> Self {
        Completion::Chain(deferred)
    }

    /// Complete by failing with a reason.
    pub fn fault(reason: E) -> Self {
        Completion::Fault(reason)
    }
}

impl<T, E> From<Result<T, E>> for Completion<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Completion::Value(value),
            Err(reason) => Completion::Fault(reason),
        }
    }
}
