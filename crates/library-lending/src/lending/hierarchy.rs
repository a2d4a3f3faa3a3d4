//! Topic tree stored as an arena of parent links.
//!
//! Descendant sets are never materialized; ancestry is resolved by walking
//! parent pointers. The walk remembers every topic it has seen so a corrupted
//! tree (cycle or dangling parent) ends the walk instead of looping.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::TopicId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<TopicId>,
}

/// Error raised when mutating the tree with an id it does not own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("unknown topic {0}")]
    UnknownTopic(TopicId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicTree {
    topics: Vec<Topic>,
}

impl TopicTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, name: impl Into<String>) -> TopicId {
        self.push(name.into(), None)
    }

    pub fn add_child(
        &mut self,
        parent: TopicId,
        name: impl Into<String>,
    ) -> Result<TopicId, HierarchyError> {
        if self.get(parent).is_none() {
            return Err(HierarchyError::UnknownTopic(parent));
        }
        Ok(self.push(name.into(), Some(parent)))
    }

    /// Re-parents a topic. No cycle check happens here; the ancestor walk
    /// tolerates cycles instead.
    pub fn set_parent(
        &mut self,
        topic: TopicId,
        parent: Option<TopicId>,
    ) -> Result<(), HierarchyError> {
        if let Some(parent) = parent {
            if self.get(parent).is_none() {
                return Err(HierarchyError::UnknownTopic(parent));
            }
        }
        let entry = self
            .topics
            .get_mut(topic.0)
            .ok_or(HierarchyError::UnknownTopic(topic))?;
        entry.parent = parent;
        Ok(())
    }

    pub fn get(&self, id: TopicId) -> Option<&Topic> {
        self.topics.get(id.0)
    }

    pub fn name(&self, id: TopicId) -> Option<&str> {
        self.get(id).map(|topic| topic.name.as_str())
    }

    pub fn contains(&self, id: TopicId) -> bool {
        id.0 < self.topics.len()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Returns true when `candidate` is a strict ancestor of `topic`.
    ///
    /// A topic is never its own ancestor. Cycles and dangling parent ids are
    /// reported and treated as "no relation".
    pub fn is_ancestor_of(&self, candidate: TopicId, topic: TopicId) -> bool {
        let mut visited = vec![false; self.topics.len()];
        if let Some(slot) = visited.get_mut(topic.0) {
            *slot = true;
        }

        let mut current = self.get(topic).and_then(|entry| entry.parent);
        while let Some(id) = current {
            let Some(seen) = visited.get_mut(id.0) else {
                warn!(%topic, parent = %id, "topic parent chain references an unknown topic");
                return false;
            };
            if *seen {
                warn!(%topic, at = %id, "cycle detected in topic hierarchy");
                return false;
            }
            *seen = true;

            if id == candidate {
                return true;
            }
            current = self.topics[id.0].parent;
        }

        false
    }

    /// Equal, ancestor, or descendant.
    pub fn related(&self, a: TopicId, b: TopicId) -> bool {
        a == b || self.is_ancestor_of(a, b) || self.is_ancestor_of(b, a)
    }

    fn push(&mut self, name: String, parent: Option<TopicId>) -> TopicId {
        let id = TopicId(self.topics.len());
        self.topics.push(Topic { name, parent });
        id
    }
}
