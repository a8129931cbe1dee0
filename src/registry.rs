//! Run-scoped bookkeeping of which ids have already been dispatched

use crate::model::{FamilyId, PersonId};
use std::collections::HashSet;
use std::hash::Hash;
use tokio::sync::Mutex;

/// A concurrent set of ids with first-wins claiming
#[derive(Debug)]
pub struct VisitedSet<Id> {
    seen: Mutex<HashSet<Id>>,
}

impl<Id: Eq + Hash + Copy> VisitedSet<Id> {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Marks `id` as visited. Returns true only for the first caller.
    pub async fn claim(&self, id: Id) -> bool {
        self.seen.lock().await.insert(id)
    }

    pub async fn is_claimed(&self, id: Id) -> bool {
        self.seen.lock().await.contains(&id)
    }
}

impl<Id: Eq + Hash + Copy> Default for VisitedSet<Id> {
    fn default() -> Self {
        Self::new()
    }
}

/// Family and person visited sets for a single traversal run
///
/// The two sets never share keys: family 5 and person 5 are unrelated.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    pub families: VisitedSet<FamilyId>,
    pub people: VisitedSet<PersonId>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_claim_is_first_wins() {
        let set = VisitedSet::new();
        assert!(set.claim(FamilyId(3)).await);
        assert!(!set.claim(FamilyId(3)).await);
        assert!(set.is_claimed(FamilyId(3)).await);
        assert!(!set.is_claimed(FamilyId(4)).await);
    }

    #[tokio::test]
    async fn test_family_and_person_keys_are_independent() {
        let registry = VisitedRegistry::new();
        assert!(registry.families.claim(FamilyId(5)).await);
        assert!(registry.people.claim(PersonId(5)).await);
        assert!(!registry.people.claim(PersonId(5)).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_have_one_winner() {
        let set = Arc::new(VisitedSet::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let set = Arc::clone(&set);
                let winners = Arc::clone(&winners);
                tokio::spawn(async move {
                    if set.claim(PersonId(42)).await {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
