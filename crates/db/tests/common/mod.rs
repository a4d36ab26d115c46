//! Shared fixtures for repository integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use splitledger_db::repositories::{
    CreateUserInput, GroupRepository, MembershipRepository, UserRepository,
};
use splitledger_db::{Migrator, entities::users};
use splitledger_shared::types::{GroupId, Money, UserId};
use sea_orm_migration::MigratorTrait;

/// Fresh in-memory database with the schema applied.
pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn money(value: Decimal) -> Money {
    Money::from_decimal(value)
}

pub async fn create_user(db: &DatabaseConnection, name: &str) -> users::Model {
    UserRepository::new(db.clone())
        .create(CreateUserInput {
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: None,
        })
        .await
        .unwrap()
}

/// Creates a group whose members are `names`, joined in that order.
pub async fn group_with_members(
    db: &DatabaseConnection,
    names: &[&str],
) -> (GroupId, Vec<UserId>) {
    let group = GroupRepository::new(db.clone())
        .create("Trip".to_string(), None)
        .await
        .unwrap();
    let group_id = GroupId::from_uuid(group.id);

    let members = MembershipRepository::new(db.clone());
    let mut ids = Vec::new();
    for name in names {
        let user = create_user(db, name).await;
        let user_id = UserId::from_uuid(user.id);
        members.add(group_id, user_id, None).await.unwrap();
        ids.push(user_id);
    }
    (group_id, ids)
}
