use sea_orm_migration::{prelude::*, sea_query::ColumnDef};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MarketUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MarketUser::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MarketUser::Username).string().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Category::Id)
                            .integer()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Category::Name)
                            .string()
                            .unique_key()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tag::Id)
                            .integer()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tag::Name).string().unique_key().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Listing::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Listing::Id)
                            .integer()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Listing::SellerId).big_integer().not_null())
                    .col(ColumnDef::new(Listing::Title).string().not_null())
                    .col(ColumnDef::new(Listing::Description).text())
                    .col(ColumnDef::new(Listing::ExternalLink).string())
                    .col(ColumnDef::new(Listing::Price).double().not_null())
                    .col(
                        ColumnDef::new(Listing::Negotiable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Listing::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listing::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Listing::ListingType).string().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(Listing::Table, Listing::SellerId)
                    .to(MarketUser::Table, MarketUser::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(ItemListing::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemListing::ListingId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ItemListing::Condition).string().not_null())
                    .col(
                        ColumnDef::new(ItemListing::CategoryId)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(ItemListing::Table, ItemListing::ListingId)
                    .to(Listing::Table, Listing::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;
        // categories are reference data; block deletion while items point at them
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(ItemListing::Table, ItemListing::CategoryId)
                    .to(Category::Table, Category::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(SubletListing::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubletListing::ListingId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubletListing::Address).string().not_null())
                    .col(ColumnDef::new(SubletListing::Beds).integer().not_null())
                    .col(ColumnDef::new(SubletListing::Baths).integer().not_null())
                    .col(ColumnDef::new(SubletListing::StartDate).date().not_null())
                    .col(ColumnDef::new(SubletListing::EndDate).date().not_null())
                    .to_owned(),
            )
            .await?;
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(SubletListing::Table, SubletListing::ListingId)
                    .to(Listing::Table, Listing::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(ListingTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ListingTag::ListingId).integer().not_null())
                    .col(ColumnDef::new(ListingTag::TagId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ListingTag::ListingId)
                            .col(ListingTag::TagId),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(ListingTag::Table, ListingTag::ListingId)
                    .to(Listing::Table, Listing::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(ListingTag::Table, ListingTag::TagId)
                    .to(Tag::Table, Tag::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Favorite::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Favorite::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Favorite::ListingId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(Favorite::UserId)
                            .col(Favorite::ListingId),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(Favorite::Table, Favorite::UserId)
                    .to(MarketUser::Table, MarketUser::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(Favorite::Table, Favorite::ListingId)
                    .to(Listing::Table, Listing::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(Offer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Offer::Id)
                            .integer()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Offer::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Offer::ListingId).integer().not_null())
                    .col(ColumnDef::new(Offer::Email).string())
                    .col(ColumnDef::new(Offer::PhoneNumber).string())
                    .col(
                        ColumnDef::new(Offer::Message)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Offer::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(Offer::Table, Offer::UserId)
                    .to(MarketUser::Table, MarketUser::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(Offer::Table, Offer::ListingId)
                    .to(Listing::Table, Listing::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;
        // at most one offer per (user, listing); the index is the source of
        // truth for duplicate rejection under concurrent inserts
        manager
            .create_index(
                IndexCreateStatement::new()
                    .table(Offer::Table)
                    .name("unique_offer_market")
                    .col(Offer::UserId)
                    .col(Offer::ListingId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(ListingImage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ListingImage::Id)
                            .integer()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ListingImage::ListingId).integer().not_null())
                    .col(ColumnDef::new(ListingImage::Url).string().not_null())
                    .col(
                        ColumnDef::new(ListingImage::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_foreign_key(
                ForeignKey::create()
                    .from(ListingImage::Table, ListingImage::ListingId)
                    .to(Listing::Table, Listing::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ListingImage::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Offer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Favorite::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ListingTag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SubletListing::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ItemListing::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Listing::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Category::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MarketUser::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum MarketUser {
    Table,
    Id,
    Username,
}

#[derive(Iden)]
pub(crate) enum Category {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
pub(crate) enum Tag {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
pub(crate) enum Listing {
    Table,
    Id,
    SellerId,
    Title,
    Description,
    ExternalLink,
    Price,
    Negotiable,
    CreatedAt,
    ExpiresAt,
    ListingType,
}

#[derive(Iden)]
pub(crate) enum ItemListing {
    Table,
    ListingId,
    Condition,
    CategoryId,
}

#[derive(Iden)]
pub(crate) enum SubletListing {
    Table,
    ListingId,
    Address,
    Beds,
    Baths,
    StartDate,
    EndDate,
}

#[derive(Iden)]
pub(crate) enum ListingTag {
    Table,
    ListingId,
    TagId,
}

#[derive(Iden)]
pub(crate) enum Favorite {
    Table,
    UserId,
    ListingId,
}

#[derive(Iden)]
pub(crate) enum Offer {
    Table,
    Id,
    UserId,
    ListingId,
    Email,
    PhoneNumber,
    Message,
    CreatedAt,
}

#[derive(Iden)]
pub(crate) enum ListingImage {
    Table,
    Id,
    ListingId,
    Url,
    DisplayOrder,
}
