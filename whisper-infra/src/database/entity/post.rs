use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use whisper_domain::PostRecord;

/// 文章实体，对应posts表
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "String(Some(255))")]
    pub slug: String,

    #[sea_orm(column_type = "String(Some(255))", nullable)]
    pub provider: Option<String>,

    pub public: bool,
    pub indexed: bool,

    #[sea_orm(column_type = "BigInteger")]
    pub creation: i64,

    #[sea_orm(column_type = "BigInteger")]
    pub modified: i64,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub excerpt: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tag::Entity")]
    Tags,
    #[sea_orm(has_many = "super::meta::Entity")]
    Metas,
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tags.def()
    }
}

impl Related<super::meta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Metas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PostRecord {
    fn from(model: Model) -> Self {
        PostRecord {
            slug: model.slug,
            provider: model.provider,
            public: model.public,
            indexed: model.indexed,
            creation: model.creation,
            modified: model.modified,
            title: model.title,
            excerpt: model.excerpt,
            content: model.content,
        }
    }
}
