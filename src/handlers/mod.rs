pub mod auth;
pub mod grammar;
pub mod recommend;
pub mod srs;
