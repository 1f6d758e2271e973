use anyhow::Context;
use rusqlite::Connection;

// Migrations are embedded so in-memory databases (tests) migrate the same way
// as file-backed ones. Applied in order, recorded in _migrations.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_verification_sessions",
        "CREATE TABLE IF NOT EXISTS verification_sessions (
            phone TEXT PRIMARY KEY,
            code TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            attempts_remaining INTEGER NOT NULL
        );",
    ),
    (
        "002_users",
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            phone TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT 'unset',
            push_token TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    ),
    (
        "003_services",
        "CREATE TABLE IF NOT EXISTS services (
            id TEXT PRIMARY KEY,
            worker_id TEXT NOT NULL REFERENCES users(id),
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            price INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    ),
    (
        "004_bookings",
        "CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL REFERENCES users(id),
            worker_id TEXT NOT NULL REFERENCES users(id),
            service_id TEXT NOT NULL REFERENCES services(id),
            status TEXT NOT NULL DEFAULT 'pending',
            scheduled_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_bookings_customer ON bookings(customer_id);
        CREATE INDEX IF NOT EXISTS idx_bookings_worker ON bookings(worker_id);",
    ),
    (
        "005_chat_messages",
        "CREATE TABLE IF NOT EXISTS chat_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            booking_id TEXT NOT NULL REFERENCES bookings(id),
            sender_id TEXT NOT NULL REFERENCES users(id),
            text TEXT NOT NULL,
            sent_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_chat_booking ON chat_messages(booking_id);",
    ),
    (
        "006_settings",
        "CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            terms_and_conditions TEXT NOT NULL DEFAULT '',
            privacy_policy TEXT NOT NULL DEFAULT '',
            faqs TEXT NOT NULL DEFAULT '[]',
            contact_info TEXT NOT NULL DEFAULT ''
        );",
    ),
];

pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        conn.execute_batch(sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;

        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])
            .with_context(|| format!("failed to record migration: {name}"))?;

        tracing::info!("applied migration: {name}");
    }

    Ok(())
}
