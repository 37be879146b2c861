use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "genres")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Lowercased `name`, matched by `search`.
    pub name_search: String,
    #[sea_orm(unique)]
    pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::genre_title::Entity")]
    GenreTitle,
}

impl Related<super::genre_title::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GenreTitle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
