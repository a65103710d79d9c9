use super::bounded_text::parse_bounded;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct SubscriptionName(String);

impl SubscriptionName {
    pub fn parse(s: String) -> Result<SubscriptionName, String> {
        parse_bounded("Name", &s, 2, 100).map(Self)
    }
}

impl AsRef<str> for SubscriptionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SubscriptionName> for String {
    fn from(name: SubscriptionName) -> Self {
        name.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct SubscriptionDescription(String);

impl SubscriptionDescription {
    pub fn parse(s: String) -> Result<SubscriptionDescription, String> {
        parse_bounded("Description", &s, 10, 500).map(Self)
    }
}

impl AsRef<str> for SubscriptionDescription {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SubscriptionDescription> for String {
    fn from(description: SubscriptionDescription) -> Self {
        description.0
    }
}
