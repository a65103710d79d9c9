use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "PKR")]
    Pkr,
}

impl AsRef<str> for Currency {
    fn as_ref(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Pkr => "PKR",
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_ref() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "PKR" => Ok(Currency::Pkr),
            other => Err(format!(
                "`{other}` is not a supported currency. Use one of USD, EUR, PKR"
            )),
        }
    }
}
