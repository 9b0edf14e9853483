pub mod auth_models;
pub mod card_models;
pub mod grammar_models;
pub mod user_models;

pub use auth_models::{LoginError, LoginForm, RegisterError, RegisterForm};
pub use card_models::{ApiResponse, DueResponse, ReviewRequest, ReviewResponse};
pub use grammar_models::{GrammarParams, GrammarPoint, GrammarResult};
pub use user_models::{NewUser, User};
