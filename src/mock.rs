//! In-memory record store for tests and offline runs

use crate::fetcher::{FetchFuture, RecordFetcher};
use crate::model::{Family, FamilyId, Person, PersonId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

const NAMES: &[&str] = &[
    "Stella", "Walter", "Edith", "Harold", "Mabel", "Arthur", "Ida", "Chester", "Opal", "Homer",
];

/// Record fetcher serving a fixed set of families and people
///
/// Counts every lookup per id so tests can check that nothing was
/// requested twice, and can add random latency to every lookup.
#[derive(Debug, Default)]
pub struct MockFetcher {
    families: HashMap<FamilyId, Family>,
    people: HashMap<PersonId, Person>,
    latency_ms: Option<(u64, u64)>,
    family_calls: Mutex<HashMap<FamilyId, usize>>,
    person_calls: Mutex<HashMap<PersonId, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a family record
    pub fn with_family(mut self, family: Family) -> Self {
        self.families.insert(family.id, family);
        self
    }

    /// Adds a person record
    pub fn with_person(mut self, person: Person) -> Self {
        self.people.insert(person.id, person);
        self
    }

    /// Delays every lookup by a random duration in `min_ms..=max_ms`
    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.latency_ms = Some((min_ms.min(max_ms), max_ms.max(min_ms)));
        self
    }

    pub async fn family_calls(&self, id: FamilyId) -> usize {
        self.family_calls.lock().await.get(&id).copied().unwrap_or(0)
    }

    pub async fn person_calls(&self, id: PersonId) -> usize {
        self.person_calls.lock().await.get(&id).copied().unwrap_or(0)
    }

    /// Highest number of lookups seen for any single id
    pub async fn max_calls_per_id(&self) -> usize {
        let families = self.family_calls.lock().await.values().copied().max().unwrap_or(0);
        let people = self.person_calls.lock().await.values().copied().max().unwrap_or(0);
        families.max(people)
    }

    /// Total lookups of either kind
    pub async fn total_calls(&self) -> usize {
        let families: usize = self.family_calls.lock().await.values().sum();
        let people: usize = self.person_calls.lock().await.values().sum();
        families + people
    }

    /// Highest number of lookups that were in progress at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn lookup<Id, T>(
        &self,
        calls: &Mutex<HashMap<Id, usize>>,
        id: Id,
        records: &HashMap<Id, T>,
    ) -> Option<T>
    where
        Id: Eq + Hash + Copy,
        T: Clone,
    {
        *calls.lock().await.entry(id).or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some((min_ms, max_ms)) = self.latency_ms {
            // Generate delay before the await to avoid Send issues
            let delay_ms = {
                let mut rng = rand::thread_rng();
                rng.gen_range(min_ms..=max_ms)
            };
            sleep(Duration::from_millis(delay_ms)).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        records.get(&id).cloned()
    }
}

impl RecordFetcher for MockFetcher {
    fn fetch_family(&self, id: FamilyId) -> FetchFuture<'_, Family> {
        Box::pin(self.lookup(&self.family_calls, id, &self.families))
    }

    fn fetch_person(&self, id: PersonId) -> FetchFuture<'_, Person> {
        Box::pin(self.lookup(&self.person_calls, id, &self.people))
    }
}

/// Configuration for mock pedigree generation
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Number of ancestor generations, the root family included
    pub generations: u32,
    /// Maximum number of extra children per family
    pub max_children: usize,
    /// Probability (0.0-1.0) that a person record is left out of the store
    pub missing_probability: f64,
    /// Probability (0.0-1.0) that an oldest-generation spouse points back at the root family
    pub cycle_probability: f64,
    /// Seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            generations: 6,
            max_children: 3,
            missing_probability: 0.0,
            cycle_probability: 0.0,
            seed: None,
        }
    }
}

/// A generated pedigree: every family and person plus the root to start from
#[derive(Debug, Clone)]
pub struct MockPedigree {
    pub root: FamilyId,
    pub families: Vec<Family>,
    pub people: Vec<Person>,
}

impl MockPedigree {
    /// Loads every record into a [`MockFetcher`]
    pub fn into_fetcher(self) -> MockFetcher {
        let fetcher = self
            .families
            .into_iter()
            .fold(MockFetcher::new(), MockFetcher::with_family);
        self.people.into_iter().fold(fetcher, MockFetcher::with_person)
    }
}

/// Generates a full ancestry `generations` deep
pub fn generate_mock_pedigree(generations: u32) -> MockPedigree {
    generate_mock_pedigree_with_config(MockConfig {
        generations,
        ..Default::default()
    })
}

/// Generates a mock pedigree with custom configuration
///
/// Each spouse of a family below the oldest generation is born into a
/// family of the next generation, which lists them among its children.
/// Family and person ids are both numbered from 1.
pub fn generate_mock_pedigree_with_config(config: MockConfig) -> MockPedigree {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let root = FamilyId(1);
    let mut next_family = 2;
    let mut next_person = 1;
    let mut families = Vec::new();
    let mut people = Vec::new();

    // (family, generation, spouse already known to be a child of this family)
    let mut pending: VecDeque<(i64, u32, Option<i64>)> = VecDeque::new();
    pending.push_back((root.0, 1, None));

    while let Some((family_id, generation, known_child)) = pending.pop_front() {
        let mut family = Family::new(family_id);
        let year = 2000 - 25 * i64::from(generation);

        if let Some(child) = known_child {
            family = family.child(child);
        }
        for _ in 0..rng.gen_range(0..=config.max_children) {
            let id = next_person;
            next_person += 1;
            family = family.child(id);
            let person = Person::new(id)
                .born_into(family_id)
                .named(random_name(&mut rng), format!("1-1-{}", year + 25));
            if !rng.gen_bool(config.missing_probability) {
                people.push(person);
            }
        }

        let husband = next_person;
        let wife = next_person + 1;
        next_person += 2;
        family = family.husband(husband).wife(wife);

        for spouse in [husband, wife] {
            let parent = if generation < config.generations {
                let parent = next_family;
                next_family += 1;
                pending.push_back((parent, generation + 1, Some(spouse)));
                parent
            } else if rng.gen_bool(config.cycle_probability) {
                root.0
            } else {
                0
            };

            let person = Person::new(spouse)
                .born_into(parent)
                .spouse_in(family_id)
                .named(random_name(&mut rng), format!("1-1-{}", year));
            if !rng.gen_bool(config.missing_probability) {
                people.push(person);
            }
        }

        families.push(family);
    }

    MockPedigree {
        root,
        families,
        people,
    }
}

fn random_name(rng: &mut StdRng) -> &'static str {
    NAMES.choose(rng).copied().unwrap_or("Unknown")
}
