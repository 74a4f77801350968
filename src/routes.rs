pub mod error;
pub mod health;
pub mod init;
pub mod user;
pub mod vessel;
