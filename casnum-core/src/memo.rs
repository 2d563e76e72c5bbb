//! Memoization caches for `CasNum` operators.
//!
//! Every arithmetic operator is pure and structurally deterministic (the
//! same operand points always produce the same result point), so — just
//! like the `functools.lru_cache` decorators on every method of the
//! original `CasNum` class — results are cached for the lifetime of the
//! [`crate::context::CasNumContext`] that computed them. There's no
//! eviction: a construction kernel is reused for one process's lifetime,
//! not held open as a long-lived server cache. Single-threaded by
//! design (see `DESIGN.md`), so a plain [`RefCell`] is enough — no
//! `Mutex` needed.
//!
//! Only successful results are memoized, mirroring `lru_cache`'s
//! behaviour of never caching a raised exception.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

/// Cache for a unary operator.
pub struct UnaryMemo<K, V> {
    cache: RefCell<HashMap<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> UnaryMemo<K, V> {
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn get_or_try_insert_with<E>(
        &self,
        key: &K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(v) = self.cache.borrow().get(key) {
            return Ok(v.clone());
        }
        let v = compute()?;
        self.cache.borrow_mut().insert(key.clone(), v.clone());
        Ok(v)
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for UnaryMemo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache for a binary operator, keyed by both operands in order
/// (`op(a, b)` and `op(b, a)` are cached independently, matching
/// `lru_cache`'s argument-order sensitivity).
pub struct BinaryMemo<K, V> {
    cache: RefCell<HashMap<(K, K), V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> BinaryMemo<K, V> {
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn get_or_try_insert_with<E>(
        &self,
        a: &K,
        b: &K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let key = (a.clone(), b.clone());
        if let Some(v) = self.cache.borrow().get(&key) {
            return Ok(v.clone());
        }
        let v = compute()?;
        self.cache.borrow_mut().insert(key, v.clone());
        Ok(v)
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for BinaryMemo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache for a ternary operator (just `pow_mod`).
pub struct TernaryMemo<K, V> {
    cache: RefCell<HashMap<(K, K, K), V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TernaryMemo<K, V> {
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn get_or_try_insert_with<E>(
        &self,
        a: &K,
        b: &K,
        c: &K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        let key = (a.clone(), b.clone(), c.clone());
        if let Some(v) = self.cache.borrow().get(&key) {
            return Ok(v.clone());
        }
        let v = compute()?;
        self.cache.borrow_mut().insert(key, v.clone());
        Ok(v)
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for TernaryMemo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn binary_memo_only_calls_compute_once() {
        let memo: BinaryMemo<i32, i32> = BinaryMemo::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(42)
        };
        assert_eq!(memo.get_or_try_insert_with(&1, &2, compute), Ok(42));
        assert_eq!(memo.get_or_try_insert_with(&1, &2, compute), Ok(42));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let memo: UnaryMemo<i32, i32> = UnaryMemo::new();
        let calls = Cell::new(0);
        let first = memo.get_or_try_insert_with(&1, || {
            calls.set(calls.get() + 1);
            Err::<i32, _>("boom")
        });
        assert!(first.is_err());
        let second = memo.get_or_try_insert_with(&1, || {
            calls.set(calls.get() + 1);
            Ok::<_, &str>(7)
        });
        assert_eq!(second, Ok(7));
        assert_eq!(calls.get(), 2);
    }
}
