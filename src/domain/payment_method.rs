use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PaymentMethod {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "PayPal")]
    PayPal,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

impl AsRef<str> for PaymentMethod {
    fn as_ref(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::BankTransfer => "Bank Transfer",
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_ref() {
            "Credit Card" => Ok(PaymentMethod::CreditCard),
            "PayPal" => Ok(PaymentMethod::PayPal),
            "Bank Transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(format!("`{other}` is not a valid payment method")),
        }
    }
}
