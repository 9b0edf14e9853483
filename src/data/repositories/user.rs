use bcrypt::{DEFAULT_COST, hash, verify};
use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::data::models::{NewUser, User};
use crate::schema::users;

pub struct UserRepository;

impl UserRepository {
    pub fn find_by_email(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<Option<User>, diesel::result::Error> {
        users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
            .optional()
    }

    pub fn verify_password(
        stored_hash: &str,
        input_password: &str,
    ) -> Result<bool, bcrypt::BcryptError> {
        verify(input_password, stored_hash)
    }

    pub fn email_exists(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<bool, diesel::result::Error> {
        use diesel::dsl::exists;

        diesel::select(exists(users::table.filter(users::email.eq(email)))).get_result(conn)
    }

    pub fn create_user(
        conn: &mut SqliteConnection,
        email: &str,
        password: &str,
    ) -> Result<User, crate::data::models::RegisterError> {
        let hashed = hash(password, DEFAULT_COST)?;
        Ok(Self::insert(conn, email, &hashed)?)
    }

    fn insert(
        conn: &mut SqliteConnection,
        email: &str,
        password: &str,
    ) -> Result<User, diesel::result::Error> {
        diesel::insert_into(users::table)
            .values(&NewUser { email, password })
            .execute(conn)?;
        let user_id = diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()"))
            .get_result::<i32>(conn)?;
        Ok(User {
            user_id,
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}
