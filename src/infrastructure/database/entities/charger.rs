//! Charger entity. Identity is the OCPP `charge_point_id` used on the
//! WebSocket path; it is the primary key, never a surrogate uuid, since the
//! connection registry is already keyed by it.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "chargers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub charge_point_id: String,
    pub vendor: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    /// Coarse availability derived from the last StatusNotification, stored
    /// as its snake_case serde representation.
    pub availability: String,
    pub heartbeat_interval_secs: i64,
    pub last_heartbeat_at: Option<DateTimeUtc>,
    pub registered_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::charging_session::Entity")]
    ChargingSession,
    #[sea_orm(has_many = "super::fault::Entity")]
    Fault,
}

impl Related<super::charging_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargingSession.def()
    }
}

impl Related<super::fault::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fault.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
