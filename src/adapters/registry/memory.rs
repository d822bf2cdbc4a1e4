use crate::{
    domain::{Membership, MembershipKey},
    ports::registry::{Error, RegistryPort},
};
use chrono::NaiveDate;
use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Arc, Mutex, PoisonError},
};
use uuid::Uuid;

/// In-memory [`RegistryPort`] implementation.
///
/// The key map and the two join-order indexes live behind a single mutex, so
/// every operation updates all of them inside one critical section and no
/// caller can observe the registry half-updated.
#[derive(Clone, Debug)]
pub struct MemoryRegistry {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    memberships: HashMap<MembershipKey, Membership>,
    by_person: HashMap<Uuid, Vec<MembershipKey>>,
    by_club: HashMap<Uuid, Vec<MembershipKey>>,
}

impl Inner {
    fn refreshed(&mut self, key: MembershipKey, today: NaiveDate) -> Result<Membership, Error> {
        let membership = self
            .memberships
            .get_mut(&key)
            .ok_or_else(|| Error::not_found(key))?;
        membership.refresh_status(today);
        Ok(membership.clone())
    }
}

#[async_trait::async_trait]
impl RegistryPort for MemoryRegistry {
    async fn link(&self, membership: Membership) -> Result<(), Error> {
        let key = membership.key();
        let mut inner = self.inner.lock()?;
        // Uniqueness check comes before any insertion; a duplicate leaves the
        // registry exactly as it was.
        match inner.memberships.entry(key) {
            Entry::Occupied(_) => return Err(Error::duplicate(key)),
            Entry::Vacant(entry) => {
                entry.insert(membership);
            }
        }
        inner.by_person.entry(key.person_id).or_default().push(key);
        inner.by_club.entry(key.club_id).or_default().push(key);
        Ok(())
    }

    async fn unlink(&self, key: MembershipKey) -> Result<Membership, Error> {
        let mut inner = self.inner.lock()?;
        let membership = inner
            .memberships
            .remove(&key)
            .ok_or_else(|| Error::not_found(key))?;
        if let Some(keys) = inner.by_person.get_mut(&key.person_id) {
            keys.retain(|k| *k != key);
        }
        if let Some(keys) = inner.by_club.get_mut(&key.club_id) {
            keys.retain(|k| *k != key);
        }
        Ok(membership)
    }

    async fn membership(
        &self,
        key: MembershipKey,
        today: NaiveDate,
    ) -> Result<Membership, Error> {
        self.inner.lock()?.refreshed(key, today)
    }

    async fn record(&self, membership: Membership) -> Result<(), Error> {
        let key = membership.key();
        let mut inner = self.inner.lock()?;
        match inner.memberships.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.insert(membership);
                Ok(())
            }
            // A membership cannot outlive its registry entry.
            Entry::Vacant(_) => Err(Error::not_found(key)),
        }
    }

    async fn memberships_of_person(
        &self,
        person_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<Membership>, Error> {
        let mut inner = self.inner.lock()?;
        let keys = inner
            .by_person
            .get(&person_id)
            .cloned()
            .unwrap_or_default();
        keys.into_iter()
            .map(|key| inner.refreshed(key, today))
            .collect()
    }

    async fn memberships_of_club(
        &self,
        club_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<Membership>, Error> {
        let mut inner = self.inner.lock()?;
        let keys = inner.by_club.get(&club_id).cloned().unwrap_or_default();
        keys.into_iter()
            .map(|key| inner.refreshed(key, today))
            .collect()
    }
}

impl MemoryRegistry {
    /// Number of memberships currently linked.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.memberships.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we
/// erase the error and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

/// We need to create a custom `From` implementation here for an error that's
/// specific to this adapter.
impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}
