use super::bounded_text::parse_bounded;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    pub const MIN_LENGTH: usize = 4;
    pub const MAX_LENGTH: usize = 50;

    pub fn parse(s: String) -> Result<UserName, String> {
        parse_bounded("Name", &s, Self::MIN_LENGTH, Self::MAX_LENGTH).map(Self)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}
