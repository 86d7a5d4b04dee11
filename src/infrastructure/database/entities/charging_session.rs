//! Charging session entity.
//!
//! `transaction_id <= 0` marks a placeholder created by RemoteStartTransaction
//! before the charger has confirmed a real OCPP transaction id (I-1).

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "charging_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub charge_point_id: String,
    pub connector_id: i32,
    pub transaction_id: i64,
    pub id_tag: String,
    pub status: String,
    pub meter_start_wh: i64,
    pub meter_stop_wh: Option<i64>,
    pub energy_kwh: Decimal,
    pub started_at: DateTimeUtc,
    pub stopped_at: Option<DateTimeUtc>,
    pub stop_reason: Option<String>,
    pub last_seen_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charger::Entity",
        from = "Column::ChargePointId",
        to = "super::charger::Column::ChargePointId"
    )]
    Charger,
    #[sea_orm(has_many = "super::meter_value::Entity")]
    MeterValue,
}

impl Related<super::charger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charger.def()
    }
}

impl Related<super::meter_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MeterValue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
