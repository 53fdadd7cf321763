//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server by its address
//! - Hold the ordered, immutable set of configured backends
//! - Reject empty, blank and duplicate configurations at construction

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A single backend server, identified by its address (`ip` or `ip:port`).
///
/// Cloning is cheap; the address is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Backend(Arc<str>);

impl Backend {
    pub fn new(addr: &str) -> Self {
        Self(Arc::from(addr))
    }

    /// The configured address of this backend.
    pub fn addr(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Backend {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Errors raised while building a [`BackendSet`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendSetError {
    #[error("backend list is empty")]
    Empty,

    #[error("backend list contains a blank entry at position {0}")]
    Blank(usize),

    #[error("backend {0} is configured more than once")]
    Duplicate(String),
}

/// Ordered, non-empty list of configured backends.
///
/// Built once at startup. There is no mutation API: changing the topology
/// requires a restart.
#[derive(Debug, Clone)]
pub struct BackendSet {
    backends: Vec<Backend>,
}

impl BackendSet {
    /// Build a set from configured addresses, preserving their order.
    /// Surrounding whitespace is trimmed from each entry.
    pub fn new<I, S>(addrs: I) -> Result<Self, BackendSetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut backends = Vec::new();

        for (i, addr) in addrs.into_iter().enumerate() {
            let addr = addr.as_ref().trim();
            if addr.is_empty() {
                return Err(BackendSetError::Blank(i));
            }
            if !seen.insert(addr.to_string()) {
                return Err(BackendSetError::Duplicate(addr.to_string()));
            }
            backends.push(Backend::new(addr));
        }

        if backends.is_empty() {
            return Err(BackendSetError::Empty);
        }

        Ok(Self { backends })
    }

    /// Backends in configured order.
    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    /// Look up a configured backend by address.
    pub fn get(&self, addr: &str) -> Option<&Backend> {
        self.backends.iter().find(|b| b.addr() == addr)
    }

    pub fn contains(&self, addr: &str) -> bool {
        self.get(addr).is_some()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Always false for a constructed set; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
