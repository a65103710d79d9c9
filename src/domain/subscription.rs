use super::{
    derive_renewal_and_status, Category, Currency, Frequency, PaymentMethod, Price, RenewalInput,
    SubscriptionDescription, SubscriptionName, SubscriptionStatus,
};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A stored subscription as returned by the API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: SubscriptionName,
    pub description: SubscriptionDescription,
    pub price: Price,
    pub currency: Currency,
    pub frequency: Frequency,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub status: SubscriptionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub renewal_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Subscription {
    /// Editable fields of the stored record, renewal date included.
    pub fn fields(&self) -> SubscriptionFields {
        SubscriptionFields {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            currency: self.currency,
            frequency: self.frequency,
            category: self.category,
            payment_method: self.payment_method,
            status: self.status,
            start_date: self.start_date,
            renewal_date: Some(self.renewal_date),
        }
    }
}

/// Individually valid subscription fields, not yet checked against each other.
#[derive(Clone, Debug)]
pub struct SubscriptionFields {
    pub name: SubscriptionName,
    pub description: SubscriptionDescription,
    pub price: Price,
    pub currency: Currency,
    pub frequency: Frequency,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub status: SubscriptionStatus,
    pub start_date: OffsetDateTime,
    pub renewal_date: Option<OffsetDateTime>,
}

impl SubscriptionFields {
    /// Checks the date constraints and derives renewal date and status as of `now`.
    pub fn finalize(self, now: OffsetDateTime) -> Result<ValidSubscription, String> {
        if self.start_date > now {
            return Err("Start date must be in the past".into());
        }

        let (renewal_date, status) = derive_renewal_and_status(
            &RenewalInput {
                start_date: self.start_date,
                frequency: self.frequency,
                renewal_date: self.renewal_date,
                status: self.status,
            },
            now,
        );

        if renewal_date <= self.start_date {
            return Err("Renewal date must be after start date".into());
        }

        Ok(ValidSubscription {
            name: self.name,
            description: self.description,
            price: self.price,
            currency: self.currency,
            frequency: self.frequency,
            category: self.category,
            payment_method: self.payment_method,
            status,
            start_date: self.start_date,
            renewal_date,
        })
    }
}

/// Subscription fields ready to be persisted.
#[derive(Clone, Debug)]
pub struct ValidSubscription {
    pub name: SubscriptionName,
    pub description: SubscriptionDescription,
    pub price: Price,
    pub currency: Currency,
    pub frequency: Frequency,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub status: SubscriptionStatus,
    pub start_date: OffsetDateTime,
    pub renewal_date: OffsetDateTime,
}
