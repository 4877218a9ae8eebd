//! Translates flat browse query parameters into structured predicates
//! against the polymorphic listing store.

use chrono::{DateTime, NaiveDate, Utc};
use quadmart_api_types::{ItemCondition, ListingType};
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr, Query};
use sea_orm::{ColumnTrait, Condition, EntityTrait, JoinType, QuerySelect, RelationTrait, Select};

use crate::entity::{category, item_listing, listing, listing_tag, sublet_listing, tag};

/// Structured filter over listings. Base predicates apply to every type;
/// variant predicates only take effect when `listing_type` selects the
/// matching variant, since they compare against that variant's columns.
#[derive(Clone, Debug, Default)]
pub struct ListingFilter {
    pub listing_type: Option<ListingType>,
    pub title: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub negotiable: Option<bool>,
    pub condition: Option<ItemCondition>,
    pub category: Option<String>,
    pub beds: Option<i32>,
    pub baths: Option<i32>,
    pub min_beds: Option<i32>,
    pub min_baths: Option<i32>,
    pub address: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Every tag narrows the result set: a listing must carry all of them.
    pub tags: Vec<String>,
    /// `seller=true`: only the viewer's own listings, expired included.
    pub seller: bool,
}

/// The select the filter predicates expect: variant tables and the item
/// category joined so their columns are addressable.
pub(crate) fn base_select() -> Select<listing::Entity> {
    listing::Entity::find()
        .join(JoinType::LeftJoin, listing::Relation::ItemListing.def())
        .join(JoinType::LeftJoin, listing::Relation::SubletListing.def())
        .join(JoinType::LeftJoin, item_listing::Relation::Category.def())
}

impl ListingFilter {
    /// Builds the WHERE condition. `viewer` is the authenticated user, if
    /// any; `now` is the expiry cutoff, fixed once per request.
    pub fn condition(&self, viewer: Option<i64>, now: DateTime<Utc>) -> Condition {
        let mut cond = Condition::all();

        if let Some(listing_type) = self.listing_type {
            cond = cond.add(
                listing::Column::ListingType
                    .eq(crate::entity::sea_orm_active_enums::ListingType::from(
                        listing_type,
                    )),
            );
        }
        if let Some(title) = &self.title {
            cond = cond.add(
                Expr::col((listing::Entity, listing::Column::Title)).ilike(format!("%{title}%")),
            );
        }
        if let Some(min_price) = self.min_price {
            cond = cond.add(listing::Column::Price.gte(min_price));
        }
        if let Some(max_price) = self.max_price {
            cond = cond.add(listing::Column::Price.lte(max_price));
        }
        if let Some(negotiable) = self.negotiable {
            cond = cond.add(listing::Column::Negotiable.eq(negotiable));
        }

        if let Some(condition) = self.condition {
            cond = cond.add(
                item_listing::Column::Condition
                    .eq(crate::entity::sea_orm_active_enums::Condition::from(
                        condition,
                    )),
            );
        }
        if let Some(category) = &self.category {
            cond = cond.add(category::Column::Name.eq(category.clone()));
        }

        if let Some(beds) = self.beds {
            cond = cond.add(sublet_listing::Column::Beds.eq(beds));
        }
        if let Some(baths) = self.baths {
            cond = cond.add(sublet_listing::Column::Baths.eq(baths));
        }
        if let Some(min_beds) = self.min_beds {
            cond = cond.add(sublet_listing::Column::Beds.gte(min_beds));
        }
        if let Some(min_baths) = self.min_baths {
            cond = cond.add(sublet_listing::Column::Baths.gte(min_baths));
        }
        if let Some(address) = &self.address {
            cond = cond.add(
                Expr::col((sublet_listing::Entity, sublet_listing::Column::Address))
                    .ilike(format!("%{address}%")),
            );
        }
        if let Some(start_date) = self.start_date {
            cond = cond.add(sublet_listing::Column::StartDate.gte(start_date));
        }
        if let Some(end_date) = self.end_date {
            cond = cond.add(sublet_listing::Column::EndDate.lte(end_date));
        }

        for tag_name in &self.tags {
            cond = cond.add(Expr::exists(
                Query::select()
                    .expr(Expr::val(1))
                    .from(listing_tag::Entity)
                    .inner_join(
                        tag::Entity,
                        Expr::col((tag::Entity, tag::Column::Id))
                            .equals((listing_tag::Entity, listing_tag::Column::TagId)),
                    )
                    .and_where(
                        Expr::col((listing_tag::Entity, listing_tag::Column::ListingId))
                            .equals((listing::Entity, listing::Column::Id)),
                    )
                    .and_where(Expr::col((tag::Entity, tag::Column::Name)).eq(tag_name.clone()))
                    .to_owned(),
            ));
        }

        // seller=true and the expiry cutoff are mutually exclusive switches
        match viewer {
            Some(viewer) if self.seller => {
                cond = cond.add(listing::Column::SellerId.eq(viewer));
            }
            _ => {
                cond = cond.add(listing::Column::ExpiresAt.gte(now));
            }
        }

        cond
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryFilter, QueryTrait};

    fn render(filter: &ListingFilter, viewer: Option<i64>) -> String {
        let now = "2026-08-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        base_select()
            .filter(filter.condition(viewer, now))
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn default_filter_only_excludes_expired() {
        let sql = render(&ListingFilter::default(), None);
        assert!(sql.contains(r#""listing"."expires_at" >="#), "{sql}");
        assert!(!sql.contains("seller_id"), "{sql}");
    }

    #[test]
    fn seller_switch_replaces_expiry_cutoff() {
        let filter = ListingFilter {
            seller: true,
            ..Default::default()
        };
        let sql = render(&filter, Some(42));
        assert!(sql.contains(r#""listing"."seller_id" = 42"#), "{sql}");
        assert!(!sql.contains("expires_at\" >="), "{sql}");
    }

    #[test]
    fn seller_switch_without_viewer_still_excludes_expired() {
        let filter = ListingFilter {
            seller: true,
            ..Default::default()
        };
        let sql = render(&filter, None);
        assert!(sql.contains(r#""listing"."expires_at" >="#), "{sql}");
    }

    #[test]
    fn title_matches_substring_case_insensitively() {
        let filter = ListingFilter {
            title: Some("textbook".to_string()),
            ..Default::default()
        };
        let sql = render(&filter, None);
        assert!(sql.contains(r#""listing"."title" ILIKE '%textbook%'"#), "{sql}");
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let filter = ListingFilter {
            min_price: Some(10.0),
            max_price: Some(50.0),
            ..Default::default()
        };
        let sql = render(&filter, None);
        assert!(sql.contains(r#""listing"."price" >= 10"#), "{sql}");
        assert!(sql.contains(r#""listing"."price" <= 50"#), "{sql}");
    }

    #[test]
    fn sublet_browse_with_min_beds_and_tag() {
        let filter = ListingFilter {
            listing_type: Some(ListingType::Sublet),
            min_beds: Some(2),
            tags: vec!["New".to_string()],
            ..Default::default()
        };
        let sql = render(&filter, None);
        assert!(sql.contains(r#""listing"."listing_type" = 'sublet'"#), "{sql}");
        assert!(sql.contains(r#""sublet_listing"."beds" >= 2"#), "{sql}");
        assert!(sql.contains("EXISTS"), "{sql}");
        assert!(sql.contains(r#""tag"."name" = 'New'"#), "{sql}");
        assert!(sql.contains(r#""listing"."expires_at" >="#), "{sql}");
    }

    #[test]
    fn each_tag_is_independently_required() {
        let filter = ListingFilter {
            tags: vec!["New".to_string(), "Laptop".to_string()],
            ..Default::default()
        };
        let sql = render(&filter, None);
        assert_eq!(sql.matches("EXISTS").count(), 2, "{sql}");
        assert!(sql.contains(r#""tag"."name" = 'New'"#), "{sql}");
        assert!(sql.contains(r#""tag"."name" = 'Laptop'"#), "{sql}");
    }

    #[test]
    fn item_predicates_address_variant_columns() {
        let filter = ListingFilter {
            listing_type: Some(ListingType::Item),
            condition: Some(ItemCondition::Good),
            category: Some("Book".to_string()),
            ..Default::default()
        };
        let sql = render(&filter, None);
        assert!(sql.contains(r#""item_listing"."condition" = 'GOOD'"#), "{sql}");
        assert!(sql.contains(r#""category"."name" = 'Book'"#), "{sql}");
    }
}
