use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Membership, MembershipKey};

/// The canonical store of memberships.
///
/// The registry owns the (person, club) uniqueness invariant and serves the
/// per-person and per-club membership views; those views are derived from the
/// same store, so they can never disagree with it. Read accessors take `today`
/// and refresh the cached status of everything they return, since status
/// depends on the clock and goes stale between calls.
#[mockall::automock]
#[async_trait::async_trait]
pub trait RegistryPort {
    /// Adds a freshly created membership.
    ///
    /// The duplicate-key check happens strictly before any insertion, so a
    /// failed call leaves the registry untouched.
    async fn link(&self, membership: Membership) -> Result<(), Error>;

    /// Removes the membership with this key from the registry and both views.
    async fn unlink(&self, key: MembershipKey) -> Result<Membership, Error>;

    /// Looks up one membership, status refreshed as of `today`.
    async fn membership(&self, key: MembershipKey, today: NaiveDate)
        -> Result<Membership, Error>;

    /// Stores back a mutated membership under its existing key.
    ///
    /// A membership cannot outlive its registry entry, so recording a key that
    /// was never linked (or was unlinked since) is an error rather than an
    /// insert.
    async fn record(&self, membership: Membership) -> Result<(), Error>;

    /// All memberships a person holds, in join order, statuses refreshed.
    async fn memberships_of_person(
        &self,
        person_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<Membership>, Error>;

    /// All memberships a club has, in join order, statuses refreshed.
    async fn memberships_of_club(
        &self,
        club_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<Membership>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The (person, club) pair is already linked.
    #[error("person {person_id} already has a membership in club {club_id}")]
    DuplicateMembership { person_id: Uuid, club_id: Uuid },

    /// No membership exists for the (person, club) pair.
    #[error("no membership found for person {person_id} in club {club_id}")]
    MembershipNotFound { person_id: Uuid, club_id: Uuid },

    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not
    /// part of the domain model, such as connectivity, configuration, or
    /// permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn duplicate(key: MembershipKey) -> Self {
        Self::DuplicateMembership {
            person_id: key.person_id,
            club_id: key.club_id,
        }
    }

    pub(crate) fn not_found(key: MembershipKey) -> Self {
        Self::MembershipNotFound {
            person_id: key.person_id,
            club_id: key.club_id,
        }
    }
}
