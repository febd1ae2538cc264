use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub user_id: Uuid,
    pub added: DateTimeWithTimeZone,
    pub likes: i32,
    pub dislikes: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::article_comments::Entity")]
    ArticleComments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::article_comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ArticleComments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
