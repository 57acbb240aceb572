pub mod accounts;
pub mod create;
pub mod error;
pub mod fork;
pub mod get;
pub mod init;
pub mod random_id;
