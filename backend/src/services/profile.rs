//! Profile service: points balance and shared location

use rust_decimal::Decimal;
use shared::{GpsCoordinates, Profile};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Profile service for reading and updating player profiles
#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

/// Database row for a profile
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub username: String,
    pub points: i32,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            points: row.points,
            location: GpsCoordinates::from_parts(row.latitude, row.longitude),
        }
    }
}

impl ProfileService {
    /// Create a new ProfileService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a profile by user ID
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, username, points, latitude, longitude
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;

        Ok(row.into())
    }

    /// Store the location weather is fetched for
    pub async fn set_location(&self, user_id: Uuid, location: GpsCoordinates) -> AppResult<Profile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles
            SET latitude = $2, longitude = $3
            WHERE id = $1
            RETURNING id, username, points, latitude, longitude
            "#,
        )
        .bind(user_id)
        .bind(location.latitude)
        .bind(location.longitude)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;

        tracing::info!("Updated location for user {}", user_id);

        Ok(row.into())
    }
}
