use rusqlite::Connection;

/// Initialize the ledger schema. Safe to run on every startup.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    // WAL lets readers (status polls) proceed while a webhook holds the write lock
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;

        -- Orders (one per purchase attempt, never deleted)
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            plan TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'paid', 'failed')),
            price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
            currency TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            settled_at INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);
        CREATE INDEX IF NOT EXISTS idx_orders_created ON orders(created_at);

        -- Entitlements (one per user, overwritten by each successful purchase)
        CREATE TABLE IF NOT EXISTS entitlements (
            user_id TEXT PRIMARY KEY,
            premium INTEGER NOT NULL,
            plan TEXT NOT NULL,
            order_id TEXT NOT NULL REFERENCES orders(id),
            granted_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        );

        -- Audit trail of payment events that reached a known order
        CREATE TABLE IF NOT EXISTS order_events (
            id TEXT PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES orders(id),
            provenance TEXT NOT NULL CHECK (provenance IN ('simulated', 'provider')),
            outcome TEXT NOT NULL CHECK (outcome IN ('paid', 'failed')),
            provider_event_id TEXT,
            result TEXT NOT NULL CHECK (result IN ('applied', 'already_terminal')),
            received_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_order_events_order ON order_events(order_id, received_at);
        CREATE INDEX IF NOT EXISTS idx_order_events_received ON order_events(received_at);
        "#,
    )?;
    Ok(())
}
