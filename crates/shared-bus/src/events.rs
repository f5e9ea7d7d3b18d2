//! # Event Topics and Filters
//!
//! Subscription filtering for `LedgerEvent` notifications.

use serde::{Deserialize, Serialize};
use shared_types::{LedgerEvent, ProductId};

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Record creation (`Registered`).
    Registration,
    /// Ownership changes (`Transferred`).
    Custody,
    /// Status text changes (`StatusChanged`).
    Status,
    /// All events (no filtering).
    All,
}

impl EventTopic {
    /// Get the topic an event is published under.
    #[must_use]
    pub fn of(event: &LedgerEvent) -> Self {
        match event {
            LedgerEvent::Registered { .. } => Self::Registration,
            LedgerEvent::Transferred { .. } => Self::Custody,
            LedgerEvent::StatusChanged { .. } => Self::Status,
        }
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Records to include. Empty means all records.
    pub products: Vec<ProductId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            products: Vec::new(),
        }
    }

    /// Create a filter for events about specific records.
    #[must_use]
    pub fn for_products(products: Vec<ProductId>) -> Self {
        Self {
            topics: Vec::new(),
            products,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&EventTopic::of(event));

        let product_match =
            self.products.is_empty() || self.products.contains(&event.product_id());

        topic_match && product_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Identity;

    fn registered(id: u64) -> LedgerEvent {
        LedgerEvent::Registered {
            id: ProductId(id),
            manufacturer: Identity::from_low_byte(1),
            name: "Widget".to_string(),
        }
    }

    fn status(id: u64) -> LedgerEvent {
        LedgerEvent::StatusChanged {
            id: ProductId(id),
            status: "Manufactured".to_string(),
            timestamp: 1,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(EventTopic::of(&registered(1)), EventTopic::Registration);
        assert_eq!(EventTopic::of(&status(1)), EventTopic::Status);
        let transfer = LedgerEvent::Transferred {
            id: ProductId(1),
            from: Identity::from_low_byte(1),
            to: Identity::from_low_byte(2),
            timestamp: 2,
        };
        assert_eq!(EventTopic::of(&transfer), EventTopic::Custody);
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        assert!(filter.matches(&registered(1)));
        assert!(filter.matches(&status(9)));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Status]);
        assert!(filter.matches(&status(1)));
        assert!(!filter.matches(&registered(1)));

        let everything = EventFilter::topics(vec![EventTopic::All]);
        assert!(everything.matches(&registered(1)));
    }

    #[test]
    fn test_filter_by_product() {
        let filter = EventFilter::for_products(vec![ProductId(2)]);
        assert!(filter.matches(&status(2)));
        assert!(!filter.matches(&status(3)));
    }

    #[test]
    fn test_filter_topic_and_product_combined() {
        let filter = EventFilter {
            topics: vec![EventTopic::Registration],
            products: vec![ProductId(1)],
        };
        assert!(filter.matches(&registered(1)));
        assert!(!filter.matches(&registered(2)));
        assert!(!filter.matches(&status(1)));
    }
}
