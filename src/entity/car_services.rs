use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "car_services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub price: Decimal,
    pub duration_minutes: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_bookings::Entity")]
    ServiceBookings,
}

impl Related<super::service_bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceBookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
