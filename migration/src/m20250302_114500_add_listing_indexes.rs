use crate::m20250214_000001_create_tables::{Listing, Offer};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                IndexCreateStatement::new()
                    .table(Listing::Table)
                    .name("ListingTitleIndex")
                    .col(Listing::Title)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                IndexCreateStatement::new()
                    .table(Listing::Table)
                    .name("ListingPriceIndex")
                    .col(Listing::Price)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                IndexCreateStatement::new()
                    .table(Listing::Table)
                    .name("ListingCreatedAtIndex")
                    .col(Listing::CreatedAt)
                    .to_owned(),
            )
            .await?;
        // the browse default filters on expiry every time
        manager
            .create_index(
                IndexCreateStatement::new()
                    .table(Listing::Table)
                    .name("ListingExpiresAtIndex")
                    .col(Listing::ExpiresAt)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                IndexCreateStatement::new()
                    .table(Listing::Table)
                    .name("ListingNegotiableIndex")
                    .col(Listing::Negotiable)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                IndexCreateStatement::new()
                    .table(Offer::Table)
                    .name("OfferUserIndex")
                    .col(Offer::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                IndexCreateStatement::new()
                    .table(Offer::Table)
                    .name("OfferListingIndex")
                    .col(Offer::ListingId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                IndexCreateStatement::new()
                    .table(Offer::Table)
                    .name("OfferCreatedAtIndex")
                    .col(Offer::CreatedAt)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (table, name) in [
            (Listing::Table.into_table_ref(), "ListingTitleIndex"),
            (Listing::Table.into_table_ref(), "ListingPriceIndex"),
            (Listing::Table.into_table_ref(), "ListingCreatedAtIndex"),
            (Listing::Table.into_table_ref(), "ListingExpiresAtIndex"),
            (Listing::Table.into_table_ref(), "ListingNegotiableIndex"),
            (Offer::Table.into_table_ref(), "OfferUserIndex"),
            (Offer::Table.into_table_ref(), "OfferListingIndex"),
            (Offer::Table.into_table_ref(), "OfferCreatedAtIndex"),
        ] {
            manager
                .drop_index(
                    IndexDropStatement::new()
                        .table(table)
                        .name(name)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}
