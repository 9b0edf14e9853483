pub mod cards;
pub mod user;

pub use cards::SqliteCardStore;
pub use user::UserRepository;
