use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "service_bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub car_service_id: Uuid,
    pub day: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::car_services::Entity",
        from = "Column::CarServiceId",
        to = "super::car_services::Column::Id"
    )]
    CarServices,
}

impl Related<super::car_services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarServices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
