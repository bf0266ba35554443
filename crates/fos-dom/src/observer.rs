//! DOM Observers
//!
//! MutationObserver: records tree, attribute and character data changes for
//! the nodes an observer watches.

use crate::{DomTree, NodeId};

/// Mutation observer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u32);

/// Mutation observer options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub character_data_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

impl MutationRecord {
    pub fn child_list(
        target: NodeId,
        added_nodes: Vec<NodeId>,
        removed_nodes: Vec<NodeId>,
        previous_sibling: Option<NodeId>,
        next_sibling: Option<NodeId>,
    ) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes,
            removed_nodes,
            previous_sibling,
            next_sibling,
            attribute_name: None,
            old_value: None,
        }
    }

    pub fn attributes(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }

    pub fn character_data(target: NodeId, old_value: String) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: None,
            old_value: Some(old_value),
        }
    }
}

/// Mutation observer
#[derive(Debug)]
pub struct MutationObserver {
    id: ObserverId,
    observed: Vec<(NodeId, MutationObserverInit)>,
    records: Vec<MutationRecord>,
}

impl MutationObserver {
    pub fn new(id: ObserverId) -> Self {
        Self {
            id,
            observed: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Observe a target; observing the same target again replaces its options
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) {
        match self.observed.iter_mut().find(|(node, _)| *node == target) {
            Some(entry) => entry.1 = options,
            None => self.observed.push((target, options)),
        }
    }

    /// Stop observing and drop undelivered records
    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.records.clear();
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.observed.iter().any(|(n, _)| *n == node)
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn has_pending(&self) -> bool {
        !self.records.is_empty()
    }

    /// Queue a record if any observation covers it.
    ///
    /// At most one record is queued per mutation even when several
    /// observations match. Old values are stripped unless requested.
    pub fn offer(&mut self, tree: &DomTree, record: &MutationRecord) {
        let matching = self.observed.iter().find(|(node, options)| {
            let in_scope = *node == record.target || (options.subtree && tree.contains(*node, record.target));
            in_scope && Self::wants(options, record)
        });

        let Some((_, options)) = matching else {
            return;
        };

        let mut record = record.clone();
        let keep_old = match record.mutation_type {
            MutationType::Attributes => options.attribute_old_value,
            MutationType::CharacterData => options.character_data_old_value,
            MutationType::ChildList => false,
        };
        if !keep_old {
            record.old_value = None;
        }
        self.records.push(record);
    }

    fn wants(options: &MutationObserverInit, record: &MutationRecord) -> bool {
        match record.mutation_type {
            MutationType::ChildList => options.child_list,
            MutationType::CharacterData => options.character_data,
            MutationType::Attributes => {
                options.attributes
                    && match (&options.attribute_filter, &record.attribute_name) {
                        (Some(filter), Some(name)) => filter.contains(name),
                        _ => true,
                    }
            }
        }
    }
}
