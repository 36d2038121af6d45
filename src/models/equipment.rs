//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::text_enum_sqlx;

/// Equipment availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    /// Can be reserved
    Disponible,
    /// Temporarily out of service
    Mantenimiento,
    /// Retired
    Baja,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Disponible => "disponible",
            EquipmentStatus::Mantenimiento => "mantenimiento",
            EquipmentStatus::Baja => "baja",
        }
    }

    pub fn is_reservable(&self) -> bool {
        *self == EquipmentStatus::Disponible
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disponible" => Ok(EquipmentStatus::Disponible),
            "mantenimiento" => Ok(EquipmentStatus::Mantenimiento),
            "baja" => Ok(EquipmentStatus::Baja),
            _ => Err(format!("Invalid equipment status: {}", s)),
        }
    }
}

text_enum_sqlx!(EquipmentStatus);

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub lab_id: i32,
    pub name: String,
    pub serial_number: Option<String>,
    pub status: EquipmentStatus,
    pub crea_date: DateTime<Utc>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 255, message = "Equipment name is required"))]
    pub name: String,
    pub serial_number: Option<String>,
    /// Defaults to `disponible`
    pub status: Option<EquipmentStatus>,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 255, message = "Equipment name cannot be empty"))]
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<EquipmentStatus>,
}
