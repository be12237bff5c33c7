//! Scene nodes
//!
//! A node is a name, a set of state flags and one slot per
//! [`ComponentKind`]. Slots hold untyped handles; the scene checks them
//! against the matching table on every read, so a slot pointing at a
//! destroyed component reads as empty.

use crate::foundation::collections::TypedRef;
use crate::scene::components::{ComponentKind, ComponentRef};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Handle to a [`Node`]
pub type NodeRef = TypedRef<Node>;

bitflags! {
    /// Node state bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct NodeFlags: u32 {
        /// Disabled by the user
        const DISABLED = 1 << 0;
        /// Disabled because the hosting instance node is not effectively enabled
        const INSTANCE_DISABLED = 1 << 1;
        /// Created by instantiating a nested scene
        const INSTANTIATED = 1 << 2;
    }
}

/// Named entity with component slots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Display name, not required to be unique
    pub name: String,
    /// State bits
    pub flags: NodeFlags,
    pub(crate) components: [ComponentRef; ComponentKind::COUNT],
}

impl Node {
    /// Node with empty slots
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Raw handle stored in the slot for `kind`, possibly stale
    pub fn component(&self, kind: ComponentKind) -> ComponentRef {
        self.components[kind.index()]
    }

    /// Not disabled by the user
    pub fn is_enabled(&self) -> bool {
        !self.flags.contains(NodeFlags::DISABLED)
    }

    /// Enabled by the user and not disabled through its hosting instance
    pub fn is_effectively_enabled(&self) -> bool {
        !self.flags.intersects(NodeFlags::DISABLED | NodeFlags::INSTANCE_DISABLED)
    }

    /// Created by instantiating a nested scene
    pub fn is_instantiated(&self) -> bool {
        self.flags.contains(NodeFlags::INSTANTIATED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_has_empty_slots() {
        let node = Node::new("root");
        for kind in ComponentKind::ALL {
            assert!(!node.component(kind).is_set());
        }
        assert!(node.is_effectively_enabled());
        assert!(!node.is_instantiated());
    }

    #[test]
    fn test_effective_state_combines_both_disable_bits() {
        let mut node = Node::new("n");
        node.flags.insert(NodeFlags::INSTANCE_DISABLED);
        assert!(node.is_enabled());
        assert!(!node.is_effectively_enabled());

        node.flags = NodeFlags::DISABLED;
        assert!(!node.is_enabled());
        assert!(!node.is_effectively_enabled());
    }
}
