use sea_orm::entity::prelude::*;

/// One-directional friendship: `user1` added `user2`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users_relationships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user1: i64,
    pub user2: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
