use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{MembershipKey, MembershipStatus},
    ports::{clock::ClockPort, registry::RegistryPort},
};
use chrono::NaiveDate;
use tower::Service;
use tracing::debug;

use super::{DomainLogic, Error};

/// Cancels one membership.
///
/// A membership still inside its paid period becomes a pending cancellation
/// and stays usable until its expiry date; a lapsed one is cancelled outright.
pub struct CancelRequest {
    key: MembershipKey,
}

impl CancelRequest {
    pub fn new(key: MembershipKey) -> Self {
        Self { key }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CancelResponse {
    pub key: MembershipKey,
    pub status: MembershipStatus,
    /// Unchanged by cancellation; the paid-through date is still honored.
    pub expiry_date: NaiveDate,
}

impl<R, C> Service<CancelRequest> for DomainLogic<R, C>
where
    R: RegistryPort + 'static,
    C: ClockPort + 'static,
{
    type Response = CancelResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CancelRequest) -> Self::Future {
        let registry = self.registry.clone();
        let clock = self.clock.clone();
        Box::pin(async move {
            let today = clock.today().await;
            let mut membership = registry.membership(req.key, today).await?;
            membership.cancel(today)?;
            registry.record(membership.clone()).await?;
            debug!(status = %membership.status(), "membership cancelled");

            Ok(CancelResponse {
                key: req.key,
                status: membership.status(),
                expiry_date: membership.expiry_date(),
            })
        })
    }
}
