//! Message types for the consumer.
//!
//! Defines the events that flow through the ingest and the per-cycle offset
//! bookkeeping used for commits.

use std::collections::BTreeMap;

/// An event received from the source topic.
///
/// Immutable once delivered. Key and payload are decoded as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Topic the event was read from.
    pub topic: String,
    /// Partition within the topic.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: i64,
    /// Message key, if any.
    pub key: Option<String>,
    /// Message value, if any.
    pub payload: Option<String>,
}

impl Event {
    /// Create a new event with no key.
    pub fn new(
        topic: impl Into<String>,
        partition: i32,
        offset: i64,
        payload: Option<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            key: None,
            payload,
        }
    }
}

/// Outcome of one poll of the event source.
#[derive(Debug)]
pub enum PollOutcome {
    /// Events delivered in this poll, in arrival order. May be empty.
    Events(Vec<Event>),
    /// The shutdown signal fired while polling.
    Cancelled,
}

/// A (topic, partition) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: i32,
}

/// First and last offset seen for one partition within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetRange {
    pub first: i64,
    pub last: i64,
}

/// Offsets consumed in one poll cycle, per partition.
///
/// Committing a cycle stores `last + 1` for every partition; rewinding a cycle
/// seeks every partition back to `first`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleOffsets {
    ranges: BTreeMap<TopicPartition, OffsetRange>,
}

impl CycleOffsets {
    /// Collect the offset ranges of a poll's events.
    pub fn from_events(events: &[Event]) -> Self {
        let mut ranges: BTreeMap<TopicPartition, OffsetRange> = BTreeMap::new();
        for event in events {
            let key = TopicPartition {
                topic: event.topic.clone(),
                partition: event.partition,
            };
            ranges
                .entry(key)
                .and_modify(|range| {
                    range.first = range.first.min(event.offset);
                    range.last = range.last.max(event.offset);
                })
                .or_insert(OffsetRange {
                    first: event.offset,
                    last: event.offset,
                });
        }
        Self { ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of partitions touched in the cycle.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Positions to commit: the offset after the last one consumed.
    pub fn commit_positions(&self) -> impl Iterator<Item = (&str, i32, i64)> {
        self.ranges
            .iter()
            .map(|(tp, range)| (tp.topic.as_str(), tp.partition, range.last + 1))
    }

    /// Positions to seek back to so the cycle is delivered again.
    pub fn rewind_positions(&self) -> impl Iterator<Item = (&str, i32, i64)> {
        self.ranges
            .iter()
            .map(|(tp, range)| (tp.topic.as_str(), tp.partition, range.first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_offsets_per_partition() {
        let events = vec![
            Event::new("wikimedia.recentchange", 0, 10, None),
            Event::new("wikimedia.recentchange", 1, 4, None),
            Event::new("wikimedia.recentchange", 0, 11, None),
            Event::new("wikimedia.recentchange", 0, 12, None),
        ];

        let offsets = CycleOffsets::from_events(&events);
        assert_eq!(offsets.len(), 2);

        let commits: Vec<_> = offsets.commit_positions().collect();
        assert_eq!(
            commits,
            vec![("wikimedia.recentchange", 0, 13), ("wikimedia.recentchange", 1, 5)]
        );

        let rewinds: Vec<_> = offsets.rewind_positions().collect();
        assert_eq!(
            rewinds,
            vec![("wikimedia.recentchange", 0, 10), ("wikimedia.recentchange", 1, 4)]
        );
    }

    #[test]
    fn test_cycle_offsets_empty() {
        let offsets = CycleOffsets::from_events(&[]);
        assert!(offsets.is_empty());
        assert_eq!(offsets.commit_positions().count(), 0);
    }
}
