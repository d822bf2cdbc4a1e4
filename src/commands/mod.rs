use std::sync::Arc;

pub mod cancel;
pub mod cascade;
pub mod enroll;
pub mod reactivate;
pub mod renew;
pub mod withdraw;

/// Orchestration layer over the registry and the clock.
///
/// One [`tower::Service`] implementation per operation; each request type gets
/// its own module. All operations run to completion before returning, and
/// every precondition failure comes back as a named error or a per-pair
/// outcome, never a panic.
pub struct DomainLogic<R, C> {
    registry: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> DomainLogic<R, C> {
    pub fn new(registry: Arc<R>, clock: Arc<C>) -> Self {
        Self { registry, clock }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("registry port error: {0:?}")]
    Registry(#[from] crate::ports::registry::Error),

    /// Rejected state transition, surfaced unchanged from the domain model.
    #[error(transparent)]
    Membership(#[from] crate::domain::membership::Error),
}
