//! Stable ID newtypes for syntax and function entities.
//!
//! IDs are distinct newtype wrappers over `u32`, so a `NodeId` cannot be
//! accidentally used where a `FunctionId` is expected.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Stable syntax node identifier. Maps to a petgraph `NodeIndex<u32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Function identity within a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Bridge between NodeId and petgraph's NodeIndex<u32>.

impl From<NodeIndex<u32>> for NodeId {
    fn from(idx: NodeIndex<u32>) -> Self {
        NodeId(idx.index() as u32)
    }
}

impl From<NodeId> for NodeIndex<u32> {
    fn from(id: NodeId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_to_node_index_roundtrip() {
        let idx = NodeIndex::<u32>::new(42);
        let node_id = NodeId::from(idx);
        assert_eq!(node_id.0, 42);

        let back: NodeIndex<u32> = node_id.into();
        assert_eq!(back.index(), 42);
    }

    #[test]
    fn id_display() {
        assert_eq!(format!("{}", NodeId(7)), "7");
        assert_eq!(format!("{}", FunctionId(3)), "3");
    }

    #[test]
    fn serde_as_map_key() {
        let mut map = std::collections::HashMap::new();
        map.insert(FunctionId(7), "run");
        let json = serde_json::to_string(&map).unwrap();
        let back: std::collections::HashMap<FunctionId, String> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back[&FunctionId(7)], "run");
    }
}
