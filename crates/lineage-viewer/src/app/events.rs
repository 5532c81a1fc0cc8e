use bevy::prelude::Event;
use lineage_core::SourceNode;
use std::sync::Arc;

/// A member was activated by clicking its node, its label, or a panel entry.
#[derive(Event, Debug, Clone)]
pub struct NodeSelected {
    /// Layout index of the member.
    pub node: usize,
    pub source: Arc<SourceNode>,
}
