use serde::Serialize;
use time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    /// Length of one billing period.
    pub fn period(&self) -> Duration {
        match self {
            Frequency::Monthly => Duration::days(30),
            Frequency::Yearly => Duration::days(365),
        }
    }
}

impl AsRef<str> for Frequency {
    fn as_ref(&self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_ref() {
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(format!(
                "`{other}` is not a supported frequency. Use either `monthly` or `yearly`"
            )),
        }
    }
}
