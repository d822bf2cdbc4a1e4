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

/// Extends one membership by `months` from its current expiry date.
pub struct RenewRequest {
    key: MembershipKey,
    months: u32,
}

impl RenewRequest {
    pub fn new(key: MembershipKey, months: u32) -> Self {
        Self { key, months }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct RenewResponse {
    pub key: MembershipKey,
    pub status: MembershipStatus,
    pub expiry_date: NaiveDate,
}

impl<R, C> Service<RenewRequest> for DomainLogic<R, C>
where
    R: RegistryPort + 'static,
    C: ClockPort + 'static,
{
    type Response = RenewResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RenewRequest) -> Self::Future {
        let registry = self.registry.clone();
        let clock = self.clock.clone();
        Box::pin(async move {
            let today = clock.today().await;
            // The read refreshes the cached status, so a membership that
            // lapsed since the last access is already Expired here.
            let mut membership = registry.membership(req.key, today).await?;
            membership.renew(today, req.months)?;
            registry.record(membership.clone()).await?;
            debug!(months = req.months, "membership renewed");

            Ok(RenewResponse {
                key: req.key,
                status: membership.status(),
                expiry_date: membership.expiry_date(),
            })
        })
    }
}
