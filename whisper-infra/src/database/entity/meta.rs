use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 元数据实体，每篇文章的每个键只有一个值
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "metas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(255))")]
    pub post_slug: String,

    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(255))")]
    pub meta_key: String,

    #[sea_orm(column_type = "Text")]
    pub meta_value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostSlug",
        to = "super::post::Column::Slug",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
