//! Breach catalog: the owner of every breach record

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::breach::{BreachId, BreachRecord, NewBreach};
use crate::error::Error;
use crate::Result;

/// Breach records keyed by sequential id.
///
/// Ids are handed out in increasing order and records are never removed, so
/// id order is insertion order.
#[derive(Debug, Clone)]
pub struct BreachCatalog {
    records: BTreeMap<BreachId, Arc<BreachRecord>>,
    next_id: BreachId,
}

impl Default for BreachCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl BreachCatalog {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Validate and store a new breach under the next id.
    ///
    /// A rejected breach does not consume an id.
    pub fn add(&mut self, new: NewBreach) -> Result<Arc<BreachRecord>> {
        let record = BreachRecord::assign(self.next_id, new)?;
        Ok(self.insert(record))
    }

    /// Re-insert a previously stored record, keeping its id.
    ///
    /// Records must arrive in increasing id order and pass the same
    /// validation as a fresh insert.
    pub fn restore(&mut self, record: BreachRecord) -> Result<Arc<BreachRecord>> {
        if record.id < self.next_id {
            return Err(Error::OutOfSequence {
                kind: "breach",
                expected: self.next_id,
                found: record.id,
            });
        }
        let record = BreachRecord::assign(record.id, record.into())?;
        Ok(self.insert(record))
    }

    fn insert(&mut self, record: BreachRecord) -> Arc<BreachRecord> {
        self.next_id = self.next_id.max(record.id.saturating_add(1));
        let record = Arc::new(record);
        self.records.insert(record.id, Arc::clone(&record));
        record
    }

    /// Missing ids are a normal outcome, not an error.
    pub fn get(&self, id: BreachId) -> Option<&BreachRecord> {
        self.records.get(&id).map(Arc::as_ref)
    }

    pub fn contains(&self, id: BreachId) -> bool {
        self.records.contains_key(&id)
    }

    /// All records in insertion order.
    pub fn list(&self) -> Vec<BreachRecord> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BreachRecord> {
        self.records.values().map(Arc::as_ref)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&BreachRecord> {
        self.iter().find(|record| record.name == name)
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
    use crate::error::Error;

    fn breach(name: &str) -> NewBreach {
        NewBreach {
            name: Some(name.into()),
            title: Some(name.into()),
            breach_date: Some("2012-05".into()),
            added_date: Some("2016-05-21".into()),
            pwn_count: Some(164_611_595),
            description: Some(format!("{name} breach")),
            data_classes: Some(vec!["Email addresses".into(), "Passwords".into()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_sequential_ids() {
        let mut catalog = BreachCatalog::new();
        let a = catalog.add(breach("Adobe")).unwrap();
        let b = catalog.add(breach("LinkedIn")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_rejected_breach_does_not_consume_id() {
        let mut catalog = BreachCatalog::new();
        let mut bad = breach("Broken");
        bad.description = None;

        assert_eq!(
            catalog.add(bad).map(|r| r.id),
            Err(Error::MissingField("description"))
        );
        assert!(catalog.is_empty());
        assert_eq!(catalog.add(breach("Adobe")).unwrap().id, 1);
    }

    #[test]
    fn test_get_missing_is_none() {
        let mut catalog = BreachCatalog::new();
        catalog.add(breach("Adobe")).unwrap();
        assert!(catalog.get(1).is_some());
        assert!(catalog.get(0).is_none());
        assert!(catalog.get(99).is_none());
    }

    #[test]
    fn test_list_in_insertion_order() {
        let mut catalog = BreachCatalog::new();
        for name in ["Adobe", "LinkedIn", "MyFitnessPal", "Target"] {
            catalog.add(breach(name)).unwrap();
        }
        let names: Vec<_> = catalog.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["Adobe", "LinkedIn", "MyFitnessPal", "Target"]);
        assert_eq!(catalog.find_by_name("Target").map(|r| r.id), Some(4));
    }

    #[test]
    fn test_restore_advances_next_id() {
        let mut catalog = BreachCatalog::new();
        let record = BreachRecord::assign(5, breach("Adobe")).unwrap();
        catalog.restore(record).unwrap();
        assert_eq!(catalog.add(breach("LinkedIn")).unwrap().id, 6);
    }

    #[test]
    fn test_restore_rejects_reused_id() {
        let mut catalog = BreachCatalog::new();
        catalog.add(breach("Adobe")).unwrap();

        let reused = BreachRecord::assign(1, breach("LinkedIn")).unwrap();
        assert_eq!(
            catalog.restore(reused),
            Err(Error::OutOfSequence {
                kind: "breach",
                expected: 2,
                found: 1
            })
        );
        assert_eq!(catalog.get(1).unwrap().name, "Adobe");
    }

    #[test]
    fn test_restore_revalidates_record() {
        let mut catalog = BreachCatalog::new();
        let mut record = BreachRecord::assign(1, breach("Adobe")).unwrap();
        record.breach_date = "2013-13".into();

        assert!(matches!(
            catalog.restore(record),
            Err(Error::InvalidDate { field: "breachDate", .. })
        ));
        assert!(catalog.is_empty());
    }
}
