//! HTTP request handlers.

pub mod books;
pub mod recommendations;
pub mod reviews;
pub mod users;
