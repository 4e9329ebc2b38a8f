//! Ordered, append-only event log kept by each emitter

use uuid::Uuid;

use crate::types::*;

/// Event log of a single token or sale
#[derive(Debug, Clone)]
pub struct EventJournal {
    emitter: Identity,
    records: Vec<EventRecord>,
}

impl EventJournal {
    /// Create an empty journal for `emitter`
    pub fn new(emitter: Identity) -> Self {
        Self {
            emitter,
            records: Vec::new(),
        }
    }

    /// Append an event and return its record
    pub fn record(&mut self, event: Event) -> EventRecord {
        let record = EventRecord {
            id: Uuid::new_v4(),
            sequence: self.records.len() as u64,
            emitter: self.emitter,
            event,
            recorded_at: chrono::Utc::now().naive_utc(),
        };
        self.records.push(record.clone());
        record
    }

    /// All records, oldest first
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_increase_from_zero() {
        let emitter = Identity::generate();
        let mut journal = EventJournal::new(emitter);
        assert!(journal.is_empty());

        let buyer = Identity::generate();
        let first = journal.record(Event::Sell { buyer, amount: 1 });
        let second = journal.record(Event::Sell { buyer, amount: 2 });

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(second.emitter, emitter);
        assert_ne!(first.id, second.id);
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.records()[1], second);
    }
}
