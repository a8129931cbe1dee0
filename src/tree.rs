//! The family tree under construction and its shared, lock-guarded wrapper

use crate::model::{Family, FamilyId, Person, PersonId};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Append-only collection of every family and person discovered in a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    families: HashMap<FamilyId, Family>,
    people: HashMap<PersonId, Person>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a family unless its id is already present.
    /// Returns true if the family was inserted.
    pub fn add_family(&mut self, family: Family) -> bool {
        match self.families.entry(family.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(family);
                true
            }
        }
    }

    /// Inserts a person unless its id is already present.
    /// Returns true if the person was inserted.
    pub fn add_person(&mut self, person: Person) -> bool {
        match self.people.entry(person.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(person);
                true
            }
        }
    }

    pub fn get_person(&self, id: PersonId) -> Option<&Person> {
        self.people.get(&id)
    }

    pub fn contains_family(&self, id: FamilyId) -> bool {
        self.families.contains_key(&id)
    }

    pub fn contains_person(&self, id: PersonId) -> bool {
        self.people.contains_key(&id)
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty() && self.people.is_empty()
    }

    /// Family ids in ascending order
    pub fn family_ids(&self) -> BTreeSet<FamilyId> {
        self.families.keys().copied().collect()
    }

    /// Person ids in ascending order
    pub fn person_ids(&self) -> BTreeSet<PersonId> {
        self.people.keys().copied().collect()
    }

    /// True when both trees hold exactly the same family and person ids
    pub fn same_ids(&self, other: &Tree) -> bool {
        self.family_ids() == other.family_ids() && self.person_ids() == other.person_ids()
    }
}

/// The tree shared by every concurrent branch of a traversal
///
/// Each insert holds the lock for the single map insert only. Callers
/// must never hold it across a fetch.
#[derive(Debug, Default)]
pub struct TreeAggregator {
    tree: Mutex<Tree>,
}

impl TreeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_family(&self, family: Family) -> bool {
        self.tree.lock().await.add_family(family)
    }

    pub async fn add_person(&self, person: Person) -> bool {
        self.tree.lock().await.add_person(person)
    }

    /// Copy of the tree as it stands right now
    pub async fn snapshot(&self) -> Tree {
        self.tree.lock().await.clone()
    }

    /// Hands back the finished tree once all branches have drained.
    ///
    /// Falls back to a copy if a straggling task still holds a reference.
    pub async fn into_tree(self: Arc<Self>) -> Tree {
        match Arc::try_unwrap(self) {
            Ok(aggregator) => aggregator.tree.into_inner(),
            Err(shared) => shared.snapshot().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_never_overwrites() {
        let mut tree = Tree::new();
        assert!(tree.add_person(Person::new(1).named("Stella", "9-3-1846")));
        assert!(!tree.add_person(Person::new(1).named("Other", "")));
        assert_eq!(tree.person_count(), 1);
        assert_eq!(tree.get_person(PersonId(1)).unwrap().name, "Stella");
    }

    #[test]
    fn test_same_numeric_id_in_both_maps() {
        let mut tree = Tree::new();
        tree.add_family(Family::new(9));
        tree.add_person(Person::new(9));
        assert!(tree.contains_family(FamilyId(9)));
        assert!(tree.contains_person(PersonId(9)));
        assert_eq!(tree.family_count(), 1);
        assert_eq!(tree.person_count(), 1);
    }

    #[test]
    fn test_same_ids_ignores_insertion_order() {
        let mut a = Tree::new();
        a.add_family(Family::new(1));
        a.add_family(Family::new(2));
        a.add_person(Person::new(3));

        let mut b = Tree::new();
        b.add_person(Person::new(3));
        b.add_family(Family::new(2));
        b.add_family(Family::new(1));

        assert!(a.same_ids(&b));
        assert_eq!(a, b);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts() {
        let aggregator = Arc::new(TreeAggregator::new());

        let handles: Vec<_> = (1..=50i64)
            .map(|i| {
                let aggregator = Arc::clone(&aggregator);
                tokio::spawn(async move {
                    aggregator.add_family(Family::new(i % 10 + 1)).await;
                    aggregator.add_person(Person::new(i)).await;
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        let tree = aggregator.into_tree().await;
        assert_eq!(tree.family_count(), 10);
        assert_eq!(tree.person_count(), 50);
    }
}
