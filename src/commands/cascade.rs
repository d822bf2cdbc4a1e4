use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::MembershipKey,
    ports::{clock::ClockPort, registry::RegistryPort},
};
use tower::Service;
use tracing::info;
use uuid::Uuid;

use super::{DomainLogic, Error};

/// Unlinks every membership a person still holds, ahead of the command layer
/// deleting the person record itself.
pub struct RemovePersonRequest {
    person_id: Uuid,
}

impl RemovePersonRequest {
    pub fn new(person_id: Uuid) -> Self {
        Self { person_id }
    }
}

/// Unlinks every membership a club still has, ahead of the club record being
/// deleted.
pub struct DissolveClubRequest {
    club_id: Uuid,
}

impl DissolveClubRequest {
    pub fn new(club_id: Uuid) -> Self {
        Self { club_id }
    }
}

/// Keys removed by a cascade, in join order.
#[derive(Debug, PartialEq, Eq)]
pub struct CascadeResponse {
    pub removed: Vec<MembershipKey>,
}

impl<R, C> Service<RemovePersonRequest> for DomainLogic<R, C>
where
    R: RegistryPort + 'static,
    C: ClockPort + 'static,
{
    type Response = CascadeResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RemovePersonRequest) -> Self::Future {
        let registry = self.registry.clone();
        let clock = self.clock.clone();
        Box::pin(async move {
            let today = clock.today().await;
            // Unlink from a snapshot of the view, not the live collection.
            let snapshot = registry.memberships_of_person(req.person_id, today).await?;
            let mut removed = Vec::with_capacity(snapshot.len());
            for membership in snapshot {
                registry.unlink(membership.key()).await?;
                removed.push(membership.key());
            }
            info!(
                person_id = %req.person_id,
                count = removed.len(),
                "cascaded person removal"
            );
            Ok(CascadeResponse { removed })
        })
    }
}

impl<R, C> Service<DissolveClubRequest> for DomainLogic<R, C>
where
    R: RegistryPort + 'static,
    C: ClockPort + 'static,
{
    type Response = CascadeResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: DissolveClubRequest) -> Self::Future {
        let registry = self.registry.clone();
        let clock = self.clock.clone();
        Box::pin(async move {
            let today = clock.today().await;
            let snapshot = registry.memberships_of_club(req.club_id, today).await?;
            let mut removed = Vec::with_capacity(snapshot.len());
            for membership in snapshot {
                registry.unlink(membership.key()).await?;
                removed.push(membership.key());
            }
            info!(
                club_id = %req.club_id,
                count = removed.len(),
                "cascaded club dissolution"
            );
            Ok(CascadeResponse { removed })
        })
    }
}
