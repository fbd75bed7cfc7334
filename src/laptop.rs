use std::fmt::Display;
use std::sync::Arc;

/// Identifier of a laptop in the catalog.
///
/// Assigned by the server when a create request arrives with an empty id, otherwise supplied
/// by the client.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LaptopId(Arc<str>);

impl LaptopId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for LaptopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for LaptopId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for LaptopId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<LaptopId> for String {
    fn from(id: LaptopId) -> Self {
        id.as_str().to_string()
    }
}
