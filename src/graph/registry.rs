//! Flat endpoint namespace shared by every node of a graph.

use std::collections::BTreeMap;

use beamsim_model::NodeId;
use serde::Serialize;

/// Location of an endpoint: owning node and index into its endpoint list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndpointHandle {
    pub node: NodeId,
    pub index: usize,
}

/// An endpoint name that is already taken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("endpoint '{name}' is already registered by node {}", .existing.node)]
pub struct Collision {
    pub name: String,
    pub existing: EndpointHandle,
}

/// Append-only mapping from fully qualified endpoint name to its handle.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EndpointRegistry {
    entries: BTreeMap<String, EndpointHandle>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one name; an existing name is never replaced.
    pub fn insert(&mut self, name: impl Into<String>, handle: EndpointHandle) -> Result<(), Collision> {
        let name = name.into();
        if let Some(existing) = self.entries.get(&name) {
            return Err(Collision {
                name,
                existing: *existing,
            });
        }
        self.entries.insert(name, handle);
        Ok(())
    }

    /// Merge the endpoint set of `node`, where `names[i]` is endpoint `i`.
    ///
    /// The whole set is checked before anything is inserted, so a collision
    /// leaves the registry unchanged.
    pub fn merge(&mut self, node: NodeId, names: &[String]) -> Result<(), Collision> {
        let mut pending: BTreeMap<&str, EndpointHandle> = BTreeMap::new();
        for (index, name) in names.iter().enumerate() {
            let handle = EndpointHandle { node, index };
            if let Some(existing) = self.entries.get(name).or_else(|| pending.get(name.as_str())) {
                return Err(Collision {
                    name: name.clone(),
                    existing: *existing,
                });
            }
            pending.insert(name, handle);
        }

        for (name, handle) in pending {
            self.entries.insert(name.to_string(), handle);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<EndpointHandle> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, EndpointHandle)> {
        self.entries.iter().map(|(name, handle)| (name.as_str(), *handle))
    }

    /// Names registered by `node`.
    pub fn names_for(&self, node: NodeId) -> Vec<&str> {
        self.iter()
            .filter(|(_, handle)| handle.node == node)
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_registers_all() {
        let mut registry = EndpointRegistry::new();
        registry
            .merge(NodeId(1), &names(&["SIM:M1", "SIM:M1.RBV"]))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("SIM:M1.RBV"),
            Some(EndpointHandle {
                node: NodeId(1),
                index: 1
            })
        );
        assert_eq!(registry.names_for(NodeId(1)).len(), 2);
    }

    #[test]
    fn test_collision_across_nodes() {
        let mut registry = EndpointRegistry::new();
        registry.merge(NodeId(1), &names(&["SIM:Volt"])).unwrap();

        let err = registry
            .merge(NodeId(2), &names(&["SIM:Other", "SIM:Volt"]))
            .unwrap_err();

        assert_eq!(err.name, "SIM:Volt");
        assert_eq!(err.existing.node, NodeId(1));
        // Nothing from the rejected set was inserted.
        assert!(!registry.contains("SIM:Other"));
    }

    #[test]
    fn test_collision_within_set() {
        let mut registry = EndpointRegistry::new();
        let err = registry
            .merge(NodeId(3), &names(&["SIM:A", "SIM:A"]))
            .unwrap_err();
        assert_eq!(err.existing, EndpointHandle { node: NodeId(3), index: 0 });
        assert!(registry.is_empty());
    }

    #[test]
    fn test_insert_never_replaces() {
        let mut registry = EndpointRegistry::new();
        let first = EndpointHandle { node: NodeId(0), index: 0 };
        registry.insert("SIM:current", first).unwrap();
        assert!(registry
            .insert("SIM:current", EndpointHandle { node: NodeId(5), index: 2 })
            .is_err());
        assert_eq!(registry.get("SIM:current"), Some(first));
    }
}
