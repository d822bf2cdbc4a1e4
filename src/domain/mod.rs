use uuid::Uuid;

pub mod membership;

pub use membership::{EventType, Membership, MembershipEvent, MembershipKey, MembershipStatus};

/// A person known to the system.
///
/// Construction and editing happen in the command layer; the domain only
/// receives already-resolved references.
#[derive(Clone, Debug)]
pub struct Person {
    /// Unique identifier for the `Person`
    ///
    /// Membership keys are built from this, not from the display fields.
    pub person_id: Uuid,
    pub name: String,
    pub email: String,
}

impl Person {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            person_id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Whether two records refer to the same person.
    ///
    /// Identity is a case-insensitive match on name OR email; either one
    /// matching means the records describe the same person. Note this is
    /// deliberately not `PartialEq`: name-or-email matching is not transitive,
    /// so it cannot be an equivalence relation.
    pub fn is_same_person(&self, other: &Person) -> bool {
        same_ignoring_case(&self.name, &other.name)
            || same_ignoring_case(&self.email, &other.email)
    }
}

/// A club that people can hold memberships in.
#[derive(Clone, Debug)]
pub struct Club {
    pub club_id: Uuid,
    pub name: String,
    pub email: String,
}

impl Club {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            club_id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Same identity rule as [`Person::is_same_person`]: case-insensitive name
    /// or email.
    pub fn is_same_club(&self, other: &Club) -> bool {
        same_ignoring_case(&self.name, &other.name)
            || same_ignoring_case(&self.email, &other.email)
    }
}

fn same_ignoring_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;

    #[test]
    fn test_same_person_by_name() {
        let a = Person::new("Alice Pauline", "alice@example.com");
        let b = Person::new("alice pauline", "other@example.com");
        assert_that!(a.is_same_person(&b)).is_true();
    }

    #[test]
    fn test_same_person_by_email() {
        let a = Person::new("Alice Pauline", "alice@example.com");
        let b = Person::new("Someone Else", "ALICE@example.com");
        assert_that!(a.is_same_person(&b)).is_true();
    }

    #[test]
    fn test_different_person() {
        let a = Person::new("Alice Pauline", "alice@example.com");
        let b = Person::new("Benson Meier", "benson@example.com");
        assert_that!(a.is_same_person(&b)).is_false();
    }

    #[test]
    fn test_same_club_by_name() {
        let a = Club::new("Chess Club", "chess@example.com");
        let b = Club::new("CHESS CLUB", "play@example.com");
        assert_that!(a.is_same_club(&b)).is_true();
    }
}
