pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_accounts_and_catalog;
mod m20250901_000002_create_orders;
mod m20250901_000003_create_loyalty;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_accounts_and_catalog::Migration),
            Box::new(m20250901_000002_create_orders::Migration),
            Box::new(m20250901_000003_create_loyalty::Migration),
        ]
    }
}
