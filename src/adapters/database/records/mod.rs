pub mod admin;
pub mod customer;
pub mod refresh_token;

pub use admin::AdminRecord;
pub use customer::CustomerRecord;
pub use refresh_token::RefreshTokenRow;
