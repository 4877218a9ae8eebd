pub use sea_orm_migration::prelude::*;

mod m20250214_000001_create_tables;
mod m20250302_114500_add_listing_indexes;
mod m20250418_091200_add_phone_verification;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250214_000001_create_tables::Migration),
            Box::new(m20250302_114500_add_listing_indexes::Migration),
            Box::new(m20250418_091200_add_phone_verification::Migration),
        ]
    }
}
