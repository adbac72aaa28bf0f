//! Ordered argument storage.
//!
//! Every [`Args`] carries a process-unique id. Tokens handed out by
//! [`Args::add`] remember that id, which is how a sealed statement detects
//! text that was compiled against a different store.
//!
//! Cloning a store forks it: the copy holds the same values under a new id,
//! so tokens issued by one are never accepted by the other.

use crate::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// A placeholder token: a reference to one value inside one [`Args`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    store: u64,
    index: usize,
}

impl Token {
    /// 1-based position of the value inside its store.
    pub fn position(&self) -> usize {
        self.index + 1
    }

    /// Id of the store that issued this token.
    pub fn store(&self) -> u64 {
        self.store
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// The same position, reissued for `store`.
    pub(crate) fn with_store(self, store: u64) -> Self {
        Self { store, ..self }
    }
}

/// An ordered collection of bound values.
#[derive(Debug, PartialEq)]
pub struct Args {
    id: u64,
    values: Vec<Value>,
}

impl Args {
    /// Create an empty store with a fresh id.
    pub fn new() -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            values: Vec::new(),
        }
    }

    /// Append a value and return the token that stands for it.
    pub fn add(&mut self, value: impl Into<Value>) -> Token {
        self.values.push(value.into());
        Token {
            store: self.id,
            index: self.values.len() - 1,
        }
    }

    /// Look up the value behind `token`, if it was issued by this store.
    pub fn get(&self, token: Token) -> Option<&Value> {
        if token.store != self.id {
            return None;
        }
        self.values.get(token.index)
    }

    /// Whether `token` was issued by this store.
    pub fn owns(&self, token: Token) -> bool {
        token.store == self.id && token.index < self.values.len()
    }

    /// Store id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of bound values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bound values in insertion order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the store and return its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Copy of this store under the same id. Only sealed statements hold one,
    /// and they never add to it.
    pub(crate) fn snapshot(&self) -> Self {
        Self {
            id: self.id,
            values: self.values.clone(),
        }
    }
}

impl Clone for Args {
    /// Fork the store: same values, fresh id.
    fn clone(&self) -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            values: self.values.clone(),
        }
    }
}

impl Default for Args {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_returns_one_based_positions() {
        let mut args = Args::new();
        let a = args.add(1234);
        let b = args.add("%Du");
        assert_eq!(a.position(), 1);
        assert_eq!(b.position(), 2);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get(b), Some(&Value::from("%Du")));
    }

    #[test]
    fn stores_have_distinct_ids() {
        let mut a = Args::new();
        let b = Args::new();
        assert_ne!(a.id(), b.id());

        let token = a.add(1);
        assert!(a.owns(token));
        assert!(!b.owns(token));
        assert_eq!(b.get(token), None);
    }

    #[test]
    fn clone_is_a_separate_store() {
        let mut a = Args::new();
        let token = a.add(true);
        let mut copy = a.clone();
        assert_ne!(copy.id(), a.id());
        assert_eq!(copy.values(), a.values());
        assert!(!copy.owns(token));
        assert_eq!(copy.get(token), None);

        let forked = copy.add("secret");
        assert!(!a.owns(forked));
        assert_eq!(copy.get(token.with_store(copy.id())), Some(&Value::Bool(true)));
    }

    #[test]
    fn snapshot_keeps_tokens_valid() {
        let mut a = Args::new();
        let token = a.add(true);
        let copy = a.snapshot();
        assert_eq!(copy.id(), a.id());
        assert_eq!(copy.get(token), Some(&Value::Bool(true)));
    }
}
