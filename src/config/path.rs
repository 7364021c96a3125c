//! Key paths for diagnostics.

use std::fmt;

use serde::{Serialize, Serializer};

/// Dotted path to a configuration entry, e.g. `detectors.i0._target`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path with `key` appended.
    pub fn child(&self, key: &str) -> Self {
        let mut parts = self.0.clone();
        parts.push(key.to_string());
        Self(parts)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl From<&[&str]> for KeyPath {
    fn from(parts: &[&str]) -> Self {
        Self(parts.iter().map(|p| p.to_string()).collect())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path = KeyPath::root().child("detectors").child("i0");
        assert_eq!(path.to_string(), "detectors.i0");
        assert_eq!(KeyPath::root().to_string(), "<root>");
    }

    #[test]
    fn test_child_does_not_alias_parent() {
        let parent = KeyPath::from(&["motors"][..]);
        let child = parent.child("m1");
        assert_eq!(parent.parts().len(), 1);
        assert_eq!(child.parts().len(), 2);
    }
}
