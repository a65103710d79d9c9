use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(into = "f64")]
pub struct Price(f64);

impl Price {
    pub fn parse(value: f64) -> Result<Price, String> {
        if !value.is_finite() {
            Err("Price must be a finite number".into())
        } else if value < 0.0 {
            Err("Price must be greater than or equal to 0".into())
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}
