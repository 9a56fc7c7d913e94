//! Garden models: growth stages, slots and planted seeds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationError;

/// Number of slots in every garden
pub const GARDEN_SLOT_COUNT: u8 = 3;

/// Discrete growth phase of a slot, serialized as its number (1-5)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum GrowthStage {
    /// Empty pot. Only used for slots with nothing planted.
    EmptyPot = 1,
    /// Freshly planted
    Dirt = 2,
    Sprout = 3,
    Adolescent = 4,
    /// Ready to harvest
    Mature = 5,
}

impl GrowthStage {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_mature(self) -> bool {
        self == GrowthStage::Mature
    }

    pub fn label(self) -> &'static str {
        match self {
            GrowthStage::EmptyPot => "Empty pot",
            GrowthStage::Dirt => "Freshly planted",
            GrowthStage::Sprout => "Sprout",
            GrowthStage::Adolescent => "Growing",
            GrowthStage::Mature => "Ready to harvest",
        }
    }
}

impl TryFrom<u8> for GrowthStage {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GrowthStage::EmptyPot),
            2 => Ok(GrowthStage::Dirt),
            3 => Ok(GrowthStage::Sprout),
            4 => Ok(GrowthStage::Adolescent),
            5 => Ok(GrowthStage::Mature),
            other => Err(ValidationError::StageOutOfRange(other.into())),
        }
    }
}

impl TryFrom<i32> for GrowthStage {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ValidationError::StageOutOfRange(value.into()))
            .and_then(GrowthStage::try_from)
    }
}

impl From<GrowthStage> for u8 {
    fn from(stage: GrowthStage) -> Self {
        stage.as_u8()
    }
}

impl std::fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Position of a plant within a garden (0..GARDEN_SLOT_COUNT)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct GardenSlot(u8);

impl GardenSlot {
    pub fn new(index: u8) -> Result<Self, ValidationError> {
        if index < GARDEN_SLOT_COUNT {
            Ok(Self(index))
        } else {
            Err(ValidationError::SlotOutOfRange(index.into()))
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// All slots of a garden, in display order
    pub fn all() -> impl Iterator<Item = GardenSlot> {
        (0..GARDEN_SLOT_COUNT).map(GardenSlot)
    }
}

impl TryFrom<u8> for GardenSlot {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        GardenSlot::new(value)
    }
}

impl TryFrom<i32> for GardenSlot {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ValidationError::SlotOutOfRange(value.into()))
            .and_then(GardenSlot::new)
    }
}

impl From<GardenSlot> for u8 {
    fn from(slot: GardenSlot) -> Self {
        slot.0
    }
}

/// A seed planted in a specific garden slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantedInstance {
    pub id: Uuid,
    /// Owner of the garden the seed sits in
    pub garden_owner_id: Uuid,
    /// User who paid for the seed (the owner or a friend)
    pub planter_id: Uuid,
    pub plant_id: Uuid,
    pub planted_at: DateTime<Utc>,
    /// Cached by the refresh job; may lag behind the live calculation
    pub current_stage: GrowthStage,
    pub is_mature: bool,
    pub harvested_at: Option<DateTime<Utc>>,
    pub harvester_id: Option<Uuid>,
    pub slot: GardenSlot,
}

impl PlantedInstance {
    pub fn is_harvested(&self) -> bool {
        self.harvested_at.is_some()
    }

    /// Whether the cached stage/maturity differ from a fresh calculation
    pub fn needs_update(&self, stage: GrowthStage) -> bool {
        self.current_stage != stage || self.is_mature != stage.is_mature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_from_number() {
        assert_eq!(GrowthStage::try_from(1u8), Ok(GrowthStage::EmptyPot));
        assert_eq!(GrowthStage::try_from(5u8), Ok(GrowthStage::Mature));
        assert!(GrowthStage::try_from(0u8).is_err());
        assert!(GrowthStage::try_from(6u8).is_err());
        assert!(GrowthStage::try_from(-1i32).is_err());
    }

    #[test]
    fn test_stage_serializes_as_number() {
        assert_eq!(serde_json::to_string(&GrowthStage::Sprout).unwrap(), "3");
        let stage: GrowthStage = serde_json::from_str("4").unwrap();
        assert_eq!(stage, GrowthStage::Adolescent);
        assert!(serde_json::from_str::<GrowthStage>("9").is_err());
    }

    #[test]
    fn test_stage_ordering() {
        assert!(GrowthStage::Dirt < GrowthStage::Sprout);
        assert!(GrowthStage::Adolescent < GrowthStage::Mature);
    }

    #[test]
    fn test_slot_bounds() {
        assert!(GardenSlot::new(0).is_ok());
        assert!(GardenSlot::new(2).is_ok());
        assert_eq!(
            GardenSlot::new(3),
            Err(ValidationError::SlotOutOfRange(3))
        );
        assert!(serde_json::from_str::<GardenSlot>("5").is_err());
        assert_eq!(GardenSlot::all().count(), 3);
    }

    #[test]
    fn test_needs_update() {
        let instance = PlantedInstance {
            id: Uuid::new_v4(),
            garden_owner_id: Uuid::new_v4(),
            planter_id: Uuid::new_v4(),
            plant_id: Uuid::new_v4(),
            planted_at: Utc::now(),
            current_stage: GrowthStage::Sprout,
            is_mature: false,
            harvested_at: None,
            harvester_id: None,
            slot: GardenSlot::new(1).unwrap(),
        };

        assert!(!instance.needs_update(GrowthStage::Sprout));
        assert!(instance.needs_update(GrowthStage::Adolescent));
        assert!(instance.needs_update(GrowthStage::Mature));
    }
}
