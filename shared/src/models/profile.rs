//! User profile models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::GpsCoordinates;

/// A player profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub points: i32,
    /// Where the user's weather is fetched for, if they shared it
    pub location: Option<GpsCoordinates>,
}
