use crate::m20250214_000001_create_tables::MarketUser;
use sea_orm_migration::{prelude::*, sea_query::ColumnDef};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum MarketUserPhone {
    PhoneNumber,
    PhoneVerified,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(MarketUser::Table)
                    .add_column(ColumnDef::new(MarketUserPhone::PhoneNumber).string())
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(MarketUser::Table)
                    .add_column(
                        ColumnDef::new(MarketUserPhone::PhoneVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(MarketUser::Table)
                    .drop_column(MarketUserPhone::PhoneVerified)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(MarketUser::Table)
                    .drop_column(MarketUserPhone::PhoneNumber)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
