use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cars")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub slug: String,
    pub image_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_cars::Entity")]
    ProductCars,
}

impl Related<super::product_cars::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductCars.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_cars::Relation::Products.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_cars::Relation::Cars.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
