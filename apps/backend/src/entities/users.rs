use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    /// Lowercased username with spaces replaced by underscores.
    pub username_safe: String,
    /// bcrypt hash of the client's md5 password hash.
    pub password_md5: String,
    pub privileges: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::users_stats::Entity")]
    UsersStats,
}

impl Related<super::users_stats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsersStats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
