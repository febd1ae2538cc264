use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub code: String,
    pub stock: i32,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub added: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_items::Entity")]
    CartItems,
    #[sea_orm(has_many = "super::product_cars::Entity")]
    ProductCars,
    #[sea_orm(has_many = "super::product_categories::Entity")]
    ProductCategories,
}

impl Related<super::cart_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::cars::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_cars::Relation::Cars.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_cars::Relation::Products.def().rev())
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_categories::Relation::Categories.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_categories::Relation::Products.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
