use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{membership, Club, Membership, Person},
    ports::{clock::ClockPort, registry, registry::RegistryPort},
};
use tower::Service;
use tracing::debug;

use super::{DomainLogic, Error};

/// Batch request linking every person in `persons` to every club in `clubs`.
///
/// Both collections come from the command layer already resolved and
/// deduplicated; this service only sees concrete references.
pub struct EnrollRequest {
    persons: Vec<Person>,
    clubs: Vec<Club>,
    months: u32,
}

impl EnrollRequest {
    /// Enrollment for the default 12-month period.
    pub fn new(persons: Vec<Person>, clubs: Vec<Club>) -> Self {
        Self {
            persons,
            clubs,
            months: membership::DEFAULT_DURATION_MONTHS,
        }
    }

    pub fn with_months(mut self, months: u32) -> Self {
        self.months = months;
        self
    }
}

/// One line of the batch report, in iteration order.
#[derive(Debug, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// Aggregated success for one club: everyone newly linked to it in this
    /// call, in iteration order. Clubs with no new links produce no entry.
    Enrolled { club: String, members: Vec<String> },
    /// Per-pair outcome for a (person, club) pair that was already linked.
    /// Never aggregated; the existing membership is left untouched.
    AlreadyMember { person: String, club: String },
}

impl fmt::Display for EnrollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollOutcome::Enrolled { club, members } => {
                write!(f, "Added to {club}: {}", members.join(", "))
            }
            EnrollOutcome::AlreadyMember { person, club } => {
                write!(f, "{person} is already a member of {club}")
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct EnrollResponse {
    pub outcomes: Vec<EnrollOutcome>,
}

impl EnrollResponse {
    /// Caller-facing report, one line per outcome.
    pub fn report(&self) -> String {
        self.outcomes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<R, C> Service<EnrollRequest> for DomainLogic<R, C>
where
    R: RegistryPort + 'static,
    C: ClockPort + 'static,
{
    type Response = EnrollResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: EnrollRequest) -> Self::Future {
        let registry = self.registry.clone();
        let clock = self.clock.clone();
        Box::pin(async move {
            // One up-front duration check; the batch starts with no mutations
            // applied or none at all.
            membership::validate_duration(req.months)?;
            let today = clock.today().await;
            debug!(
                persons = req.persons.len(),
                clubs = req.clubs.len(),
                months = req.months,
                "processing batch enrollment"
            );

            let mut outcomes = Vec::new();
            for club in &req.clubs {
                let mut added = Vec::new();
                for person in &req.persons {
                    let membership =
                        Membership::new(person.person_id, club.club_id, today, req.months)?;
                    match registry.link(membership).await {
                        Ok(()) => added.push(person.name.clone()),
                        // An existing membership is reported per pair and does
                        // not abort the rest of the batch.
                        Err(registry::Error::DuplicateMembership { .. }) => {
                            outcomes.push(EnrollOutcome::AlreadyMember {
                                person: person.name.clone(),
                                club: club.name.clone(),
                            });
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
                if !added.is_empty() {
                    outcomes.push(EnrollOutcome::Enrolled {
                        club: club.name.clone(),
                        members: added,
                    });
                }
            }

            Ok(EnrollResponse { outcomes })
        })
    }
}
