use super::{Frequency, SubscriptionStatus};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug)]
pub struct RenewalInput {
    pub start_date: OffsetDateTime,
    pub frequency: Frequency,
    pub renewal_date: Option<OffsetDateTime>,
    pub status: SubscriptionStatus,
}

/// Fills in a missing renewal date from the start date and billing frequency,
/// then marks the subscription expired if that date is already behind `now`.
///
/// Runs before every write; stored rows are not re-evaluated in between.
pub fn derive_renewal_and_status(
    input: &RenewalInput,
    now: OffsetDateTime,
) -> (OffsetDateTime, SubscriptionStatus) {
    let renewal_date = input
        .renewal_date
        .unwrap_or_else(|| input.start_date + input.frequency.period());

    let status = if renewal_date < now {
        SubscriptionStatus::Expired
    } else {
        input.status
    };

    (renewal_date, status)
}
