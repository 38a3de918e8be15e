mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::payments::CheckoutProvider;
use crate::util::ValidityPolicy;

pub type DbPool = Pool<SqliteConnectionManager>;

/// How long a connection waits on the SQLite write lock before giving up.
/// Settlement takes the lock with `BEGIN IMMEDIATE`, so concurrent webhook
/// deliveries queue here instead of failing with SQLITE_BUSY.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Orders, entitlements and the event audit trail
    pub db: DbPool,
    /// Base URL for redirects (e.g., https://pay.example.com)
    pub base_url: String,
    /// Shared secret the front-end presents to create orders
    pub server_secret: String,
    /// Creates the payment redirect for new orders
    pub checkout: CheckoutProvider,
    /// Entitlement validity window per plan
    pub validity: ValidityPolicy,
    /// Whether unsigned `/webhook/simulate` events are accepted
    pub allow_simulated_webhooks: bool,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });
    Pool::builder().max_size(10).build(manager)
}
