use super::{Password, UserEmail, UserName};

pub struct NewUser {
    pub name: UserName,
    pub email: UserEmail,
    pub password: Password,
}
