use chrono::{NaiveDate, Utc};

use crate::ports::clock::ClockPort;

/// Wall-clock implementation of [`ClockPort`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[async_trait::async_trait]
impl ClockPort for SystemClock {
    async fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
