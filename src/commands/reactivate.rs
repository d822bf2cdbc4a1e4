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

/// Brings a cancelled or expired membership back to active.
pub struct ReactivateRequest {
    key: MembershipKey,
    months: u32,
}

impl ReactivateRequest {
    pub fn new(key: MembershipKey, months: u32) -> Self {
        Self { key, months }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ReactivateResponse {
    pub key: MembershipKey,
    pub status: MembershipStatus,
    pub expiry_date: NaiveDate,
}

impl<R, C> Service<ReactivateRequest> for DomainLogic<R, C>
where
    R: RegistryPort + 'static,
    C: ClockPort + 'static,
{
    type Response = ReactivateResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ReactivateRequest) -> Self::Future {
        let registry = self.registry.clone();
        let clock = self.clock.clone();
        Box::pin(async move {
            let today = clock.today().await;
            let mut membership = registry.membership(req.key, today).await?;
            membership.reactivate(today, req.months)?;
            registry.record(membership.clone()).await?;
            debug!(
                months = req.months,
                expiry = %membership.expiry_date(),
                "membership reactivated"
            );

            Ok(ReactivateResponse {
                key: req.key,
                status: membership.status(),
                expiry_date: membership.expiry_date(),
            })
        })
    }
}
