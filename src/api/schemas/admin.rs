use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AdminLogin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminSession {
    pub username: String,
}
