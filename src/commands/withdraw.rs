use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{Club, MembershipKey, Person},
    ports::{clock::ClockPort, registry, registry::RegistryPort},
};
use tower::Service;
use tracing::debug;

use super::{DomainLogic, Error};

/// Batch request unlinking every person in `persons` from every club in
/// `clubs`. Mirrors [`super::enroll::EnrollRequest`], with "already absent"
/// taking the place of "duplicate."
pub struct WithdrawRequest {
    persons: Vec<Person>,
    clubs: Vec<Club>,
}

impl WithdrawRequest {
    pub fn new(persons: Vec<Person>, clubs: Vec<Club>) -> Self {
        Self { persons, clubs }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum WithdrawOutcome {
    /// Aggregated success for one club: everyone unlinked from it in this
    /// call, in iteration order.
    Withdrawn { club: String, members: Vec<String> },
    /// Per-pair outcome for a (person, club) pair that was not linked.
    NotMember { person: String, club: String },
}

impl fmt::Display for WithdrawOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithdrawOutcome::Withdrawn { club, members } => {
                write!(f, "Removed from {club}: {}", members.join(", "))
            }
            WithdrawOutcome::NotMember { person, club } => {
                write!(f, "{person} is not a member of {club}")
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct WithdrawResponse {
    pub outcomes: Vec<WithdrawOutcome>,
}

impl WithdrawResponse {
    pub fn report(&self) -> String {
        self.outcomes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<R, C> Service<WithdrawRequest> for DomainLogic<R, C>
where
    R: RegistryPort + 'static,
    C: ClockPort + 'static,
{
    type Response = WithdrawResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: WithdrawRequest) -> Self::Future {
        let registry = self.registry.clone();
        Box::pin(async move {
            debug!(
                persons = req.persons.len(),
                clubs = req.clubs.len(),
                "processing batch withdrawal"
            );

            let mut outcomes = Vec::new();
            for club in &req.clubs {
                let mut removed = Vec::new();
                for person in &req.persons {
                    let key = MembershipKey::new(person.person_id, club.club_id);
                    match registry.unlink(key).await {
                        Ok(_) => removed.push(person.name.clone()),
                        Err(registry::Error::MembershipNotFound { .. }) => {
                            outcomes.push(WithdrawOutcome::NotMember {
                                person: person.name.clone(),
                                club: club.name.clone(),
                            });
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
                if !removed.is_empty() {
                    outcomes.push(WithdrawOutcome::Withdrawn {
                        club: club.name.clone(),
                        members: removed,
                    });
                }
            }

            Ok(WithdrawResponse { outcomes })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::registry::memory::MemoryRegistry, domain::Membership,
        ports::clock::MockClockPort,
    };
    use chrono::NaiveDate;
    use rstest::*;
    use speculoos::prelude::*;
    use std::sync::Arc;
    use tower::{BoxError, ServiceExt};

    #[fixture]
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn test_withdraw_partial(today: NaiveDate) -> Result<(), BoxError> {
        // GIVEN only Alice linked to the chess club
        let registry = MemoryRegistry::default();
        let alice = Person::new("Alice", "alice@example.com");
        let benson = Person::new("Benson", "benson@example.com");
        let chess = Club::new("Chess Club", "chess@example.com");
        registry
            .link(Membership::new(alice.person_id, chess.club_id, today, 12).unwrap())
            .await?;

        let clock = MockClockPort::new();
        let mut domain = DomainLogic::new(Arc::new(registry.clone()), Arc::new(clock));

        // WHEN withdrawing both
        let req = WithdrawRequest::new(vec![alice.clone(), benson.clone()], vec![chess.clone()]);
        let res = ServiceExt::<WithdrawRequest>::ready(&mut domain).await?.call(req).await?;

        // THEN the missing pair is reported per pair, the rollup names Alice
        assert_that!(res.outcomes).is_equal_to(vec![
            WithdrawOutcome::NotMember {
                person: "Benson".to_string(),
                club: "Chess Club".to_string(),
            },
            WithdrawOutcome::Withdrawn {
                club: "Chess Club".to_string(),
                members: vec!["Alice".to_string()],
            },
        ]);
        assert_that!(registry.is_empty()).is_true();
        let view = registry
            .memberships_of_person(alice.person_id, today)
            .await?;
        assert_that!(view).is_empty();
        Ok(())
    }

    #[rstest]
    #[tokio::test]
    async fn test_withdraw_nothing_linked(today: NaiveDate) -> Result<(), BoxError> {
        let registry = MemoryRegistry::default();
        let alice = Person::new("Alice", "alice@example.com");
        let chess = Club::new("Chess Club", "chess@example.com");

        let clock = MockClockPort::new();
        let mut domain = DomainLogic::new(Arc::new(registry), Arc::new(clock));

        let req = WithdrawRequest::new(vec![alice], vec![chess]);
        let res = ServiceExt::<WithdrawRequest>::ready(&mut domain).await?.call(req).await?;

        // No rollup line when a club loses nobody.
        assert_that!(res.outcomes).is_equal_to(vec![WithdrawOutcome::NotMember {
            person: "Alice".to_string(),
            club: "Chess Club".to_string(),
        }]);
        assert_that!(res.report())
            .is_equal_to("Alice is not a member of Chess Club".to_string());
        Ok(())
    }
}
