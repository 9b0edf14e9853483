pub mod grammar;
pub mod recommend;
