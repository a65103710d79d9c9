use super::SubscriptionStatus;
use time::{Duration, OffsetDateTime};

/// Days before renewal at which the owner is reminded, in firing order.
pub const REMINDER_OFFSETS: [i16; 4] = [7, 5, 3, 1];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReminderStep {
    pub days_before: i16,
    pub label: String,
    /// Wall-clock instant at which the step may run.
    pub remind_at: OffsetDateTime,
}

impl ReminderStep {
    pub fn label_for(days_before: i16) -> String {
        format!("Reminder {days_before} days before")
    }
}

/// Whether a subscription still wants renewal reminders at `now`.
pub fn is_remindable(
    status: SubscriptionStatus,
    renewal_date: OffsetDateTime,
    now: OffsetDateTime,
) -> bool {
    status == SubscriptionStatus::Active && renewal_date >= now
}

/// Plans one step per reminder offset.
///
/// A step whose instant still lies ahead sleeps until then; a step whose
/// instant has already gone by is due immediately. Returns an empty plan when
/// the renewal date itself has passed.
pub fn plan_reminders(renewal_date: OffsetDateTime, now: OffsetDateTime) -> Vec<ReminderStep> {
    if renewal_date < now {
        return Vec::new();
    }

    REMINDER_OFFSETS
        .iter()
        .map(|&days_before| {
            let reminder_date = renewal_date - Duration::days(days_before.into());
            ReminderStep {
                days_before,
                label: ReminderStep::label_for(days_before),
                remind_at: reminder_date.max(now),
            }
        })
        .collect()
}
