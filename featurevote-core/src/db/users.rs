use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{get_time, get_uuid, is_unique_violation, now, time_to_sql, Database};
use crate::error::{Error, Result};
use crate::models::{CreateUserInput, UpdateUserInput, User, MAX_USERNAME_LEN};

const USER_COLUMNS: &str = "id, username, email, created_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: get_uuid(row, 0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: get_time(row, 3)?,
    })
}

fn validate_username(raw: &str) -> Result<String> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(Error::Validation("Username may not be blank.".into()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(Error::Validation(format!(
            "Ensure username has no more than {} characters.",
            MAX_USERNAME_LEN
        )));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        return Err(Error::Validation(
            "Username may contain only letters, numbers, and @/./+/-/_ characters.".into(),
        ));
    }
    Ok(username.to_string())
}

fn validate_email(raw: Option<String>) -> Result<Option<String>> {
    let Some(email) = raw.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()) else {
        return Ok(None);
    };
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(Some(email)),
        _ => Err(Error::Validation("Enter a valid email address.".into())),
    }
}

fn map_username_taken(err: rusqlite::Error) -> Error {
    if is_unique_violation(&err) {
        Error::Validation("A user with that username already exists.".into())
    } else {
        Error::Database(err)
    }
}

pub(crate) fn user_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM users WHERE id = ?1",
            params![id.to_string()],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

impl Database {
    pub fn create_user(&self, input: CreateUserInput) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            username: validate_username(&input.username)?,
            email: validate_email(input.email)?,
            created_at: now(),
        };

        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    user.id.to_string(),
                    user.username,
                    user.email,
                    time_to_sql(user.created_at)
                ],
            )
            .map_err(map_username_taken)?;
            Ok(())
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.with_connection(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
            Ok(conn
                .query_row(&sql, params![id.to_string()], row_to_user)
                .optional()?)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.with_connection(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
            Ok(conn
                .query_row(&sql, params![username], row_to_user)
                .optional()?)
        })
    }

    /// Change a user's own profile.
    pub fn update_user(&self, id: Uuid, input: UpdateUserInput) -> Result<User> {
        let username = input.username.as_deref().map(validate_username).transpose()?;
        let email = input.email.map(|e| validate_email(Some(e))).transpose()?;

        let user = self.with_transaction(|tx| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
            let mut user = tx
                .query_row(&sql, params![id.to_string()], row_to_user)
                .optional()?
                .ok_or_else(Error::user_not_found)?;

            if let Some(username) = username {
                user.username = username;
            }
            if let Some(email) = email {
                user.email = email;
            }

            tx.execute(
                "UPDATE users SET username = ?2, email = ?3 WHERE id = ?1",
                params![id.to_string(), user.username, user.email],
            )
            .map_err(map_username_taken)?;
            Ok(user)
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "Updated user profile");
        Ok(user)
    }

    /// Return the user named `username`, registering it first if needed.
    pub fn get_or_create_user(&self, username: &str) -> Result<(User, bool)> {
        if let Some(user) = self.get_user_by_username(username)? {
            return Ok((user, false));
        }
        let user = self.create_user(CreateUserInput {
            username: username.to_string(),
            email: None,
        })?;
        Ok((user, true))
    }
}
