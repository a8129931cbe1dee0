//! Record types returned by the family record store

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a family (a union of up to two spouses and their children)
///
/// Zero and negative values mean "no family" and are never fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(pub i64);

/// Identifier of a single person
///
/// Zero and negative values mean "no person" and are never fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl FamilyId {
    /// Returns true if this id refers to a fetchable family
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl PersonId {
    /// Returns true if this id refers to a fetchable person
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl From<i64> for FamilyId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<i64> for PersonId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// An individual in the pedigree
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier for this person
    pub id: PersonId,
    /// Given name
    #[serde(default)]
    pub name: String,
    /// Birth date as reported by the record store
    #[serde(default)]
    pub birth: String,
    /// Family this person was born into (0 when unknown)
    #[serde(default)]
    pub parent_id: FamilyId,
    /// Family in which this person is a spouse (0 when none)
    #[serde(default)]
    pub family_id: FamilyId,
}

impl Person {
    /// Creates a person with no name and no family links
    pub fn new(id: i64) -> Self {
        Self {
            id: PersonId(id),
            ..Default::default()
        }
    }

    /// Sets the family this person was born into
    pub fn born_into(mut self, family: i64) -> Self {
        self.parent_id = FamilyId(family);
        self
    }

    /// Sets the family in which this person is a spouse
    pub fn spouse_in(mut self, family: i64) -> Self {
        self.family_id = FamilyId(family);
        self
    }

    /// Sets the descriptive fields
    pub fn named(mut self, name: impl Into<String>, birth: impl Into<String>) -> Self {
        self.name = name.into();
        self.birth = birth.into();
        self
    }
}

/// A union linking up to two spouses and their children
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Family {
    /// Unique identifier for this family
    pub id: FamilyId,
    /// Husband, 0 when none
    #[serde(default)]
    pub husband_id: PersonId,
    /// Wife, 0 when none
    #[serde(default)]
    pub wife_id: PersonId,
    /// Children in the order the record store lists them
    #[serde(default)]
    pub children: Vec<PersonId>,
}

impl Family {
    /// Creates a family with no spouses and no children
    pub fn new(id: i64) -> Self {
        Self {
            id: FamilyId(id),
            ..Default::default()
        }
    }

    /// Sets the husband
    pub fn husband(mut self, id: i64) -> Self {
        self.husband_id = PersonId(id);
        self
    }

    /// Sets the wife
    pub fn wife(mut self, id: i64) -> Self {
        self.wife_id = PersonId(id);
        self
    }

    /// Appends a child
    pub fn child(mut self, id: i64) -> Self {
        self.children.push(PersonId(id));
        self
    }

    /// Husband, wife and children that refer to real people, in that order
    pub fn linked_people(&self) -> Vec<PersonId> {
        std::iter::once(self.husband_id)
            .chain(std::iter::once(self.wife_id))
            .chain(self.children.iter().copied())
            .filter(|id| id.is_valid())
            .collect()
    }
}
