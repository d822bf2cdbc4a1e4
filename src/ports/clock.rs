use chrono::NaiveDate;

/// Source of the current date.
///
/// The domain model and the command layer never read the wall clock directly;
/// everything time-dependent goes through this port so tests can pin the date.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ClockPort {
    async fn today(&self) -> NaiveDate;
}
