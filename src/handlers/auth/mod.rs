use axum::response::Redirect;

use crate::data::models::LoginError;

pub mod login;
pub mod register;

pub async fn handle_logout(session: tower_sessions::Session) -> Result<Redirect, LoginError> {
    session.flush().await.map_err(|e| {
        log::error!("Failed to clear session: {}", e);
        LoginError::SessionError("Failed to logout".into())
    })?;
    Ok(Redirect::to("/"))
}
