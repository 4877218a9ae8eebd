pub mod entity;

mod categories;
mod common_type_conversions;
mod error;
mod favorites;
mod filter;
mod images;
mod listings;
mod offers;
mod tags;
mod users;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

pub use error::{DbError, DbResult};
pub use filter::ListingFilter;
pub use listings::{FullListing, ListingChanges, NewListing};
pub use offers::NewOffer;

/// Handle to the marketplace database. Cheap to clone; all repository
/// methods hang off this type, split across per-domain modules.
#[derive(Clone, Debug)]
pub struct MarketDb {
    db: DatabaseConnection,
}

impl MarketDb {
    /// Connects to the database at `url` and brings the schema up to date.
    pub async fn connect(url: &str) -> DbResult<Self> {
        let mut opt = ConnectOptions::new(url.to_string());
        opt.max_connections(90).min_connections(0);
        let db: DatabaseConnection = Database::connect(opt).await?;
        Migrator::up(&db, None).await?;
        info!("database connected, migrations applied");

        Ok(Self { db })
    }

    /// Wraps an existing connection, used by integration harnesses.
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }
}
