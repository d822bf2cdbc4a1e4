use chrono::{Months, NaiveDate};
use uuid::Uuid;

/// Shortest membership period that can be purchased, in months.
pub const MIN_DURATION_MONTHS: u32 = 1;
/// Longest membership period that can be purchased, in months.
pub const MAX_DURATION_MONTHS: u32 = 24;
/// Period used when the caller does not specify one.
pub const DEFAULT_DURATION_MONTHS: u32 = 12;

/// Identity of a membership: the (person, club) pair.
///
/// Two memberships are the same membership iff their keys are equal; dates and
/// status never participate in identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MembershipKey {
    pub person_id: Uuid,
    pub club_id: Uuid,
}

impl MembershipKey {
    pub fn new(person_id: Uuid, club_id: Uuid) -> Self {
        Self { person_id, club_id }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MembershipStatus {
    Active,
    Expired,
    PendingCancellation,
    Cancelled,
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Expired => "expired",
            MembershipStatus::PendingCancellation => "pending cancellation",
            MembershipStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventType {
    Join,
    Renew,
    Cancel,
    Reactivate,
}

/// One entry in a membership's audit trail.
///
/// Events are immutable once recorded and only ever appended, oldest first;
/// they are the source of truth for how the expiry date and status reached
/// their current values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembershipEvent {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub event_date: NaiveDate,
    /// Months added to the membership by this event; zero for cancellations.
    pub months_added: u32,
    /// Expiry date in effect after this event was applied.
    pub resulting_expiry: NaiveDate,
}

impl MembershipEvent {
    fn record(
        event_type: EventType,
        event_date: NaiveDate,
        months_added: u32,
        resulting_expiry: NaiveDate,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            event_date,
            months_added,
            resulting_expiry,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// Requested period outside the supported range.
    #[error(
        "membership duration must be between {MIN_DURATION_MONTHS} and \
         {MAX_DURATION_MONTHS} months, got {0}"
    )]
    InvalidDuration(u32),

    /// Renewal attempted on a membership that needs reactivation first.
    #[error("cannot renew a {0} membership; reactivate it instead")]
    MustReactivate(MembershipStatus),

    /// Renewal attempted while a cancellation is pending.
    #[error("cannot renew a membership that is pending cancellation")]
    RenewPendingCancellation,

    #[error("membership is already cancelled")]
    AlreadyCancelled,

    #[error("membership is already pending cancellation")]
    AlreadyPending,

    #[error("membership is already active")]
    AlreadyActive,
}

/// One person's enrollment in one club.
///
/// The state machine is time-driven but never reads the clock itself; every
/// transition takes `today` from the caller so behavior is reproducible in
/// tests. Fields are private: the only way state changes is through the
/// transition methods, each of which appends exactly one event.
#[derive(Clone, Debug)]
pub struct Membership {
    key: MembershipKey,
    join_date: NaiveDate,
    expiry_date: NaiveDate,
    status: MembershipStatus,
    events: Vec<MembershipEvent>,
}

impl Membership {
    /// Creates a new active membership joining `today` and expiring `months`
    /// later.
    pub fn new(
        person_id: Uuid,
        club_id: Uuid,
        today: NaiveDate,
        months: u32,
    ) -> Result<Self, Error> {
        validate_duration(months)?;
        let expiry_date = add_months(today, months);
        Ok(Self {
            key: MembershipKey::new(person_id, club_id),
            join_date: today,
            expiry_date,
            status: MembershipStatus::Active,
            events: vec![MembershipEvent::record(
                EventType::Join,
                today,
                months,
                expiry_date,
            )],
        })
    }

    pub fn key(&self) -> MembershipKey {
        self.key
    }

    pub fn join_date(&self) -> NaiveDate {
        self.join_date
    }

    pub fn expiry_date(&self) -> NaiveDate {
        self.expiry_date
    }

    pub fn status(&self) -> MembershipStatus {
        self.status
    }

    /// Audit trail, oldest first. Never empty; the first entry is always the
    /// join event.
    pub fn events(&self) -> &[MembershipEvent] {
        &self.events
    }

    /// Whether the paid-through date has passed.
    pub fn is_lapsed(&self, today: NaiveDate) -> bool {
        today > self.expiry_date
    }

    /// Folds the passage of time into the stored status.
    ///
    /// Status is a cached value derived from the expiry date and the clock, so
    /// this must run whenever the membership is read after time may have
    /// advanced (the registry does this on every accessor). Idempotent; does
    /// not append an event.
    pub fn refresh_status(&mut self, today: NaiveDate) {
        if !self.is_lapsed(today) {
            return;
        }
        match self.status {
            MembershipStatus::Active => self.status = MembershipStatus::Expired,
            MembershipStatus::PendingCancellation => self.status = MembershipStatus::Cancelled,
            MembershipStatus::Expired | MembershipStatus::Cancelled => {}
        }
    }

    /// Extends the membership by `months` from its current expiry date.
    ///
    /// Renewal keeps the remaining paid time: the new expiry is relative to
    /// the old expiry, not to `today`. Cancelled and expired memberships must
    /// be reactivated instead; a pending cancellation blocks renewal outright.
    pub fn renew(&mut self, today: NaiveDate, months: u32) -> Result<(), Error> {
        validate_duration(months)?;
        match self.status {
            MembershipStatus::Cancelled | MembershipStatus::Expired => {
                return Err(Error::MustReactivate(self.status));
            }
            MembershipStatus::PendingCancellation => {
                return Err(Error::RenewPendingCancellation);
            }
            MembershipStatus::Active => {}
        }
        self.expiry_date = add_months(self.expiry_date, months);
        self.status = MembershipStatus::Active;
        self.events.push(MembershipEvent::record(
            EventType::Renew,
            today,
            months,
            self.expiry_date,
        ));
        Ok(())
    }

    /// Cancels the membership.
    ///
    /// If the paid period has already elapsed there is nothing left to honor
    /// and the membership goes straight to cancelled; otherwise it stays
    /// usable through its expiry date as a pending cancellation. The expiry
    /// date itself is untouched.
    pub fn cancel(&mut self, today: NaiveDate) -> Result<(), Error> {
        match self.status {
            MembershipStatus::Cancelled => return Err(Error::AlreadyCancelled),
            MembershipStatus::PendingCancellation => return Err(Error::AlreadyPending),
            MembershipStatus::Active | MembershipStatus::Expired => {}
        }
        self.status = if self.is_lapsed(today) {
            MembershipStatus::Cancelled
        } else {
            MembershipStatus::PendingCancellation
        };
        self.events.push(MembershipEvent::record(
            EventType::Cancel,
            today,
            0,
            self.expiry_date,
        ));
        Ok(())
    }

    /// Brings a non-active membership back to active for another `months`.
    ///
    /// A membership reactivated within a previously paid, not-yet-elapsed
    /// window keeps that remaining time (the new period extends the current
    /// expiry); one that has lapsed starts fresh from `today`.
    pub fn reactivate(&mut self, today: NaiveDate, months: u32) -> Result<(), Error> {
        validate_duration(months)?;
        if self.status == MembershipStatus::Active {
            return Err(Error::AlreadyActive);
        }
        self.expiry_date = if self.is_lapsed(today) {
            add_months(today, months)
        } else {
            add_months(self.expiry_date, months)
        };
        self.status = MembershipStatus::Active;
        self.events.push(MembershipEvent::record(
            EventType::Reactivate,
            today,
            months,
            self.expiry_date,
        ));
        Ok(())
    }
}

/// Checks a requested period against the supported range.
pub fn validate_duration(months: u32) -> Result<(), Error> {
    if !(MIN_DURATION_MONTHS..=MAX_DURATION_MONTHS).contains(&months) {
        return Err(Error::InvalidDuration(months));
    }
    Ok(())
}

/// Calendar-month addition, saturating at the end of the representable range.
fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::*;
    use speculoos::prelude::*;

    #[fixture]
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
    }

    fn membership(today: NaiveDate, months: u32) -> Membership {
        Membership::new(Uuid::new_v4(), Uuid::new_v4(), today, months).unwrap()
    }

    #[rstest]
    fn test_new_defaults(today: NaiveDate) {
        let m = membership(today, DEFAULT_DURATION_MONTHS);
        assert_that!(m.status()).is_equal_to(MembershipStatus::Active);
        assert_that!(m.join_date()).is_equal_to(today);
        assert_that!(m.expiry_date()).is_equal_to(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_that!(m.events().len()).is_equal_to(1);
        assert_that!(m.events()[0].event_type).is_equal_to(EventType::Join);
        assert_that!(m.events()[0].months_added).is_equal_to(DEFAULT_DURATION_MONTHS);
        assert_that!(m.events()[0].resulting_expiry).is_equal_to(m.expiry_date());
    }

    #[rstest]
    #[case(0)]
    #[case(25)]
    fn test_new_invalid_duration(today: NaiveDate, #[case] months: u32) {
        let res = Membership::new(Uuid::new_v4(), Uuid::new_v4(), today, months);
        assert_that!(res.err()).contains_value(&Error::InvalidDuration(months));
    }

    #[rstest]
    #[case(1)]
    #[case(24)]
    fn test_renew_boundary_ok(today: NaiveDate, #[case] months: u32) {
        let mut m = membership(today, 12);
        assert_that!(m.renew(today, months)).is_ok();
    }

    #[rstest]
    #[case(0)]
    #[case(25)]
    fn test_renew_boundary_invalid(today: NaiveDate, #[case] months: u32) {
        let mut m = membership(today, 12);
        assert_that!(m.renew(today, months).err()).contains_value(&Error::InvalidDuration(months));
    }

    #[rstest]
    fn test_renew_extends_from_expiry_not_today(today: NaiveDate) {
        let mut m = membership(today, 12);
        // Renewing well before the expiry date still extends from the expiry.
        m.renew(today + Duration::days(30), 6).unwrap();
        assert_that!(m.expiry_date()).is_equal_to(NaiveDate::from_ymd_opt(2024, 12, 15).unwrap());
        assert_that!(m.status()).is_equal_to(MembershipStatus::Active);
        assert_that!(m.events().len()).is_equal_to(2);
        assert_that!(m.events()[1].event_type).is_equal_to(EventType::Renew);
    }

    #[rstest]
    fn test_renew_expired_must_reactivate(today: NaiveDate) {
        let mut m = membership(today, 1);
        let later = today + Duration::days(60);
        m.refresh_status(later);
        assert_that!(m.renew(later, 6).err())
            .contains_value(&Error::MustReactivate(MembershipStatus::Expired));
    }

    #[rstest]
    fn test_renew_cancelled_must_reactivate(today: NaiveDate) {
        let mut m = membership(today, 1);
        let later = today + Duration::days(60);
        m.refresh_status(later);
        m.cancel(later).unwrap();
        assert_that!(m.renew(later, 6).err())
            .contains_value(&Error::MustReactivate(MembershipStatus::Cancelled));
    }

    #[rstest]
    fn test_renew_pending_cancellation_blocked(today: NaiveDate) {
        let mut m = membership(today, 12);
        m.cancel(today).unwrap();
        assert_that!(m.renew(today, 6).err()).contains_value(&Error::RenewPendingCancellation);
    }

    #[rstest]
    fn test_cancel_before_expiry_goes_pending(today: NaiveDate) {
        let mut m = membership(today, 12);
        m.cancel(today).unwrap();
        assert_that!(m.status()).is_equal_to(MembershipStatus::PendingCancellation);
        // Cancellation honors the already-paid period.
        assert_that!(m.expiry_date()).is_equal_to(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        let last = m.events().last().unwrap();
        assert_that!(last.event_type).is_equal_to(EventType::Cancel);
        assert_that!(last.months_added).is_equal_to(0);
        assert_that!(last.resulting_expiry).is_equal_to(m.expiry_date());
    }

    #[rstest]
    fn test_cancel_after_lapse_goes_straight_to_cancelled(today: NaiveDate) {
        let mut m = membership(today, 1);
        let later = today + Duration::days(60);
        m.cancel(later).unwrap();
        assert_that!(m.status()).is_equal_to(MembershipStatus::Cancelled);
    }

    #[rstest]
    fn test_cancel_twice_rejected(today: NaiveDate) {
        let mut m = membership(today, 12);
        m.cancel(today).unwrap();
        assert_that!(m.cancel(today).err()).contains_value(&Error::AlreadyPending);

        let mut m = membership(today, 1);
        m.cancel(today + Duration::days(60)).unwrap();
        assert_that!(m.cancel(today + Duration::days(61)).err())
            .contains_value(&Error::AlreadyCancelled);
    }

    #[rstest]
    fn test_reactivate_active_rejected(today: NaiveDate) {
        let mut m = membership(today, 12);
        assert_that!(m.reactivate(today, 3).err()).contains_value(&Error::AlreadyActive);
    }

    /// Cancel-then-reactivate before the paid period elapses keeps the
    /// remaining time: the new period extends the preserved expiry date.
    #[rstest]
    fn test_reactivate_before_lapse_preserves_remaining_time(today: NaiveDate) {
        let mut m = membership(today, 12);
        m.cancel(today).unwrap();
        m.reactivate(today, 1).unwrap();
        assert_that!(m.expiry_date()).is_equal_to(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap());
        assert_that!(m.status()).is_equal_to(MembershipStatus::Active);
    }

    /// Reactivation after the membership lapsed has no remaining time to
    /// preserve, so the new period starts from today.
    #[rstest]
    fn test_reactivate_after_lapse_starts_fresh(today: NaiveDate) {
        let mut m = membership(today, 1);
        let later = today + Duration::days(60);
        m.cancel(later).unwrap();
        m.reactivate(later, 3).unwrap();
        assert_that!(m.expiry_date()).is_equal_to(add_months(later, 3));
        assert_that!(m.status()).is_equal_to(MembershipStatus::Active);
    }

    #[rstest]
    fn test_refresh_status_transitions(today: NaiveDate) {
        let later = today + Duration::days(60);

        let mut m = membership(today, 1);
        m.refresh_status(later);
        assert_that!(m.status()).is_equal_to(MembershipStatus::Expired);

        let mut m = membership(today, 1);
        m.cancel(today).unwrap();
        m.refresh_status(later);
        assert_that!(m.status()).is_equal_to(MembershipStatus::Cancelled);
    }

    #[rstest]
    fn test_refresh_status_noop_before_expiry(today: NaiveDate) {
        let mut m = membership(today, 12);
        m.refresh_status(today);
        // Expiry day itself is still within the paid period.
        m.refresh_status(m.expiry_date());
        assert_that!(m.status()).is_equal_to(MembershipStatus::Active);
    }

    #[rstest]
    fn test_refresh_status_idempotent_and_eventless(today: NaiveDate) {
        let mut m = membership(today, 1);
        let later = today + Duration::days(60);
        m.refresh_status(later);
        m.refresh_status(later);
        assert_that!(m.status()).is_equal_to(MembershipStatus::Expired);
        assert_that!(m.events().len()).is_equal_to(1);
    }

    /// Every successful transition appends exactly one event and never
    /// disturbs the existing prefix.
    #[rstest]
    fn test_event_history_grows_monotonically(today: NaiveDate) {
        let mut m = membership(today, 12);
        let mut snapshot = m.events().to_vec();

        m.renew(today, 2).unwrap();
        assert_that!(m.events().len()).is_equal_to(2);
        assert_that!((&m.events()[..1])).is_equal_to(&snapshot[..]);
        snapshot = m.events().to_vec();

        m.cancel(today).unwrap();
        assert_that!(m.events().len()).is_equal_to(3);
        assert_that!((&m.events()[..2])).is_equal_to(&snapshot[..]);
        snapshot = m.events().to_vec();

        m.reactivate(today, 1).unwrap();
        assert_that!(m.events().len()).is_equal_to(4);
        assert_that!((&m.events()[..3])).is_equal_to(&snapshot[..]);
        assert_that!(m.events()[0].event_type).is_equal_to(EventType::Join);
    }

    /// Failed transitions leave the membership untouched.
    #[rstest]
    fn test_failed_transition_appends_nothing(today: NaiveDate) {
        let mut m = membership(today, 12);
        let expiry = m.expiry_date();
        assert_that!(m.renew(today, 0)).is_err();
        assert_that!(m.reactivate(today, 3)).is_err();
        assert_that!(m.events().len()).is_equal_to(1);
        assert_that!(m.expiry_date()).is_equal_to(expiry);
        assert_that!(m.status()).is_equal_to(MembershipStatus::Active);
    }
}
