pub mod library;
pub mod login;
pub mod search;
