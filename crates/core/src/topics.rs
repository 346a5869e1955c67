//! Expand/collapse state for the landing page pricing topics.
//!
//! Every topic starts collapsed. The state travels in the `open` query
//! parameter as a comma-separated list of topic ids, so a plain reload of `/`
//! shows everything collapsed again.

use std::collections::BTreeSet;

/// Set of expanded topic ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicToggles {
    open: BTreeSet<String>,
}

impl TopicToggles {
    /// Parse `a,b,c`. Blank segments are ignored.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        let open = value
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Self { open }
    }

    /// Serialize for the `open` query parameter. Empty when nothing is open.
    #[must_use]
    pub fn to_query(&self) -> String {
        self.open.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    }

    #[must_use]
    pub fn is_expanded(&self, topic_id: &str) -> bool {
        self.open.contains(topic_id)
    }

    /// Flip one topic; the others are untouched.
    pub fn toggle(&mut self, topic_id: &str) {
        if !self.open.remove(topic_id) {
            self.open.insert(topic_id.to_owned());
        }
    }

    /// A copy with `topic_id` flipped, used to build each topic's link.
    #[must_use]
    pub fn toggled(&self, topic_id: &str) -> Self {
        let mut next = self.clone();
        next.toggle(topic_id);
        next
    }
}
