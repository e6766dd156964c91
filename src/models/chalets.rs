use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::database::{Collection, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ChaletStatus {
    #[default]
    Pending,
    Approved,
}

/// Housekeeping state of a chalet between stays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    #[default]
    Ready,
    Cleaning,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chalet {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub price_per_night: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub max_guests: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_live: bool,
    pub status: ChaletStatus,
    #[serde(default)]
    pub service_status: ServiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chalet {
    /// Visible in the public catalog.
    pub fn is_public(&self) -> bool {
        self.status == ChaletStatus::Approved && self.is_live
    }
}

impl Record for Chalet {
    const COLLECTION: Collection = Collection::Chalets;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Partial chalet used for create and edit. Absent fields keep their current
/// value (or the default for new chalets).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChaletDraft {
    pub id: Option<String>,
    pub owner_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price_per_night: Option<f64>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub max_guests: Option<u32>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub is_live: Option<bool>,
    pub status: Option<ChaletStatus>,
    pub service_status: Option<ServiceStatus>,
}

/// Exact-match filter; every supplied field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChaletFilter {
    pub owner_id: Option<String>,
    pub status: Option<ChaletStatus>,
    pub is_live: Option<bool>,
    pub service_status: Option<ServiceStatus>,
    pub location: Option<String>,
}

impl ChaletFilter {
    pub fn matches(&self, chalet: &Chalet) -> bool {
        self.owner_id.as_ref().is_none_or(|v| *v == chalet.owner_id)
            && self.status.is_none_or(|v| v == chalet.status)
            && self.is_live.is_none_or(|v| v == chalet.is_live)
            && self.service_status.is_none_or(|v| v == chalet.service_status)
            && self.location.as_ref().is_none_or(|v| *v == chalet.location)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetChaletApproval {
    pub status: ChaletStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateServiceStatus {
    pub service_status: ServiceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetChaletLive {
    pub is_live: bool,
}
