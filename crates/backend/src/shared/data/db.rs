use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Tables of the host platform read by the analytics source. Created only when
/// missing so a fresh database can be used for demos and tests; an existing
/// host schema is never altered.
const HOST_TABLES: [(&str, &str); 4] = [
    (
        "order",
        r#"
        CREATE TABLE IF NOT EXISTS "order" (
            id TEXT PRIMARY KEY NOT NULL,
            created_at TEXT NOT NULL,
            customer_id TEXT NOT NULL,
            status TEXT NOT NULL,
            currency_code TEXT NOT NULL,
            total REAL NOT NULL DEFAULT 0,
            region_id TEXT,
            sales_channel_id TEXT,
            payment_provider_id TEXT
        );
    "#,
    ),
    (
        "order_discount",
        r#"
        CREATE TABLE IF NOT EXISTS order_discount (
            order_id TEXT NOT NULL,
            code TEXT NOT NULL,
            PRIMARY KEY (order_id, code)
        );
    "#,
    ),
    (
        "customer",
        r#"
        CREATE TABLE IF NOT EXISTS customer (
            id TEXT PRIMARY KEY NOT NULL,
            created_at TEXT NOT NULL,
            has_account INTEGER NOT NULL DEFAULT 0
        );
    "#,
    ),
    (
        "line_item",
        r#"
        CREATE TABLE IF NOT EXISTS line_item (
            id TEXT PRIMARY KEY NOT NULL,
            order_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            variant_id TEXT NOT NULL,
            variant_title TEXT,
            quantity INTEGER NOT NULL DEFAULT 0
        );
    "#,
    ),
];

/// Connect to the SQLite file and make sure the host tables exist
pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/app.db");
    if let Some(parent) = Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    ensure_host_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Create the host tables the analytics source reads, if missing
pub async fn ensure_host_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (table, ddl) in HOST_TABLES {
        let exists = conn
            .query_all(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "SELECT name FROM sqlite_master WHERE type='table' AND name = ?;",
                [table.into()],
            ))
            .await?;
        if exists.is_empty() {
            tracing::info!("Creating {} table", table);
            conn.execute(Statement::from_string(DatabaseBackend::Sqlite, ddl.to_string()))
                .await?;
        }
    }
    Ok(())
}

pub fn get_connection() -> anyhow::Result<&'static DatabaseConnection> {
    DB_CONN
        .get()
        .ok_or_else(|| anyhow::anyhow!("Database connection has not been initialized"))
}
