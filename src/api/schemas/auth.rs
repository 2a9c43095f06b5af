use crate::domain::customer::ProfileUpdate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

impl From<UpdateProfile> for ProfileUpdate {
    fn from(body: UpdateProfile) -> Self {
        Self { full_name: body.full_name, phone: body.phone }
    }
}
