pub mod beatmaps;
pub mod users;
pub mod users_relationships;
pub mod users_stats;

pub use beatmaps::Entity as Beatmaps;
pub use users::Entity as Users;
pub use users_relationships::Entity as UsersRelationships;
pub use users_stats::Entity as UsersStats;
