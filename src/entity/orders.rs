use sea_orm::entity::prelude::*;

/// One order per cart. Either `user_id` (registered buyer) or the
/// `guest_*` fields are set; the schema does not enforce the exclusivity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub cart_id: Uuid,
    pub user_id: Option<Uuid>,
    pub guest_first_name: Option<String>,
    pub guest_last_name: Option<String>,
    pub guest_email: Option<String>,
    pub address_city: String,
    pub address_zipcode: String,
    pub address_street: String,
    pub address_country: String,
    pub delivery_method: String,
    pub payment_method: String,
    pub paid: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::carts::Entity",
        from = "Column::CartId",
        to = "super::carts::Column::Id"
    )]
    Carts,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::carts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
