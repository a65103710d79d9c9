use secrecy::{ExposeSecret, Secret};

#[derive(Debug)]
pub struct Password(Secret<String>);

impl Password {
    pub const MIN_LENGTH: usize = 6;
    pub const MAX_LENGTH: usize = 128;

    pub fn parse(password: Secret<String>) -> Result<Password, String> {
        let length = password.expose_secret().chars().count();

        if length == 0 {
            Err("Password is required".into())
        } else if length < Self::MIN_LENGTH {
            Err(format!(
                "Password must be at least {} characters long",
                Self::MIN_LENGTH
            ))
        } else if length > Self::MAX_LENGTH {
            Err(format!(
                "Password must be at most {} characters long",
                Self::MAX_LENGTH
            ))
        } else {
            Ok(Self(password))
        }
    }

    pub fn into_secret(self) -> Secret<String> {
        self.0
    }
}
