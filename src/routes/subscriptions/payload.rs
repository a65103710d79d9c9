use crate::domain::{
    Category, Currency, Frequency, PaymentMethod, Price, Subscription, SubscriptionDescription,
    SubscriptionFields, SubscriptionName, SubscriptionStatus,
};
use serde::{Deserialize, Deserializer};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};

/// Subscription fields as sent by clients. Every field is optional so the
/// same body serves creation and partial updates.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SubscriptionPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub frequency: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_instant")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "deserialize_instant")]
    pub renewal_date: Option<OffsetDateTime>,
}

impl SubscriptionPayload {
    /// Validates a creation body, applying defaults for optional fields.
    pub fn into_fields(self) -> Result<SubscriptionFields, String> {
        Ok(SubscriptionFields {
            name: SubscriptionName::parse(required(self.name, "Name")?)?,
            description: SubscriptionDescription::parse(required(self.description, "Description")?)?,
            price: Price::parse(required(self.price, "Price")?)?,
            currency: self.currency.map(Currency::try_from).transpose()?.unwrap_or_default(),
            frequency: self.frequency.map(Frequency::try_from).transpose()?.unwrap_or_default(),
            category: Category::try_from(required(self.category, "Category")?)?,
            payment_method: PaymentMethod::try_from(required(self.payment_method, "Payment method")?)?,
            status: self.status.map(SubscriptionStatus::try_from).transpose()?.unwrap_or_default(),
            start_date: required(self.start_date, "Start date")?,
            renewal_date: self.renewal_date,
        })
    }

    /// Merges an update body over a stored subscription.
    ///
    /// Changing the start date or frequency without naming a renewal date
    /// drops the stored renewal date so it is derived again.
    pub fn apply_to(self, existing: &Subscription) -> Result<SubscriptionFields, String> {
        let mut fields = existing.fields();

        if let Some(renewal_date) = self.renewal_date {
            fields.renewal_date = Some(renewal_date);
        } else if self.start_date.is_some() || self.frequency.is_some() {
            fields.renewal_date = None;
        }

        if let Some(name) = self.name {
            fields.name = SubscriptionName::parse(name)?;
        }
        if let Some(description) = self.description {
            fields.description = SubscriptionDescription::parse(description)?;
        }
        if let Some(price) = self.price {
            fields.price = Price::parse(price)?;
        }
        if let Some(currency) = self.currency {
            fields.currency = currency.try_into()?;
        }
        if let Some(frequency) = self.frequency {
            fields.frequency = frequency.try_into()?;
        }
        if let Some(category) = self.category {
            fields.category = category.try_into()?;
        }
        if let Some(payment_method) = self.payment_method {
            fields.payment_method = payment_method.try_into()?;
        }
        if let Some(status) = self.status {
            fields.status = status.try_into()?;
        }
        if let Some(start_date) = self.start_date {
            fields.start_date = start_date;
        }

        Ok(fields)
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("{field} is required"))
}

/// Accepts RFC 3339 timestamps as well as bare `YYYY-MM-DD` dates (midnight UTC).
fn deserialize_instant<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    parse_instant(&raw).map(Some).map_err(serde::de::Error::custom)
}

fn parse_instant(raw: &str) -> Result<OffsetDateTime, String> {
    if let Ok(instant) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(instant);
    }

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_utc())
        .map_err(|_| format!("`{raw}` is not a valid date"))
}
