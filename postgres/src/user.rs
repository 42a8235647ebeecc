//! User accounts.

use crate::rows::{self, USER_COLUMNS};
use crate::{PostgresStore, is_unique_violation, storage, violated_constraint};
use async_trait::async_trait;
use venue_booking_core::providers::UserRepository;
use venue_booking_core::{BookingError, Credential, Result, User, UserId};

#[async_trait]
impl UserRepository for PostgresStore {
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> Result<User> {
        let (password_hash, oauth_provider, oauth_subject) = match &user.credential {
            Credential::Password { hash } => (Some(hash.as_str()), None, None),
            Credential::OAuth { provider, subject } => {
                (None, Some(provider.as_str()), Some(subject.as_str()))
            }
        };

        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(user.id.as_uuid())
            .bind(&user.username)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(password_hash)
            .bind(oauth_provider)
            .bind(oauth_subject)
            .bind(user.phone.as_deref())
            .bind(user.location.as_deref())
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    match violated_constraint(&e).as_deref() {
                        Some("users_email_key") => BookingError::Duplicate {
                            field: "email",
                            value: user.email.clone(),
                        },
                        _ => BookingError::Duplicate {
                            field: "username",
                            value: user.username.clone(),
                        },
                    }
                } else {
                    storage("Failed to create user")(e)
                }
            })?;

        rows::user(&row)
    }

    async fn get(&self, id: UserId) -> Result<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage("Failed to get user"))?
            .ok_or_else(|| BookingError::not_found("User", id))?;

        rows::user(&row)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(storage("Failed to list users"))?;

        rows.iter().map(rows::user).collect()
    }
}
