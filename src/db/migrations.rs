//! Database migrations
//!
//! Code-based migrations embedded as SQL strings for single-binary
//! deployment. Each migration has a unique, sequential version; applied
//! versions are tracked in the `_migrations` table and never re-run.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements to apply
    pub up: &'static str,
}

/// All migrations for the CareBridge backend.
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: users synced from the identity provider
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id VARCHAR(128) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL,
                first_name VARCHAR(100),
                last_name VARCHAR(100),
                avatar_url TEXT,
                role VARCHAR(20) NOT NULL DEFAULT 'user',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_external_id ON users(external_id);
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
        "#,
    },
    // Migration 2: news articles
    Migration {
        version: 2,
        name: "create_news",
        up: r#"
            CREATE TABLE IF NOT EXISTS news (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                summary TEXT NOT NULL,
                content TEXT NOT NULL,
                content_html TEXT NOT NULL,
                category VARCHAR(20) NOT NULL DEFAULT 'announcement',
                images TEXT NOT NULL DEFAULT '[]',
                videos TEXT NOT NULL DEFAULT '[]',
                institution VARCHAR(255),
                location VARCHAR(255),
                start_date TIMESTAMP NOT NULL,
                end_date TIMESTAMP,
                is_published BOOLEAN NOT NULL DEFAULT 0,
                published_at TIMESTAMP,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_news_published ON news(is_published, published_at);
            CREATE INDEX IF NOT EXISTS idx_news_category ON news(category);
        "#,
    },
    // Migration 3: programs
    Migration {
        version: 3,
        name: "create_programs",
        up: r#"
            CREATE TABLE IF NOT EXISTS programs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                goal TEXT,
                start_date TIMESTAMP NOT NULL,
                end_date TIMESTAMP,
                location VARCHAR(255),
                images TEXT NOT NULL DEFAULT '[]',
                videos TEXT NOT NULL DEFAULT '[]',
                status VARCHAR(20) NOT NULL DEFAULT 'upcoming',
                contact_person VARCHAR(255),
                contact_phone VARCHAR(50),
                contact_email VARCHAR(255),
                tags TEXT NOT NULL DEFAULT '[]',
                is_featured BOOLEAN NOT NULL DEFAULT 0,
                is_approved BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_programs_approved ON programs(is_approved, status);
            CREATE INDEX IF NOT EXISTS idx_programs_featured ON programs(is_featured);
        "#,
    },
    // Migration 4: gallery items
    Migration {
        version: 4,
        name: "create_gallery",
        up: r#"
            CREATE TABLE IF NOT EXISTS gallery (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                kind VARCHAR(10) NOT NULL,
                url TEXT NOT NULL,
                thumbnail_url TEXT,
                category VARCHAR(20) NOT NULL DEFAULT 'events',
                event_date TIMESTAMP NOT NULL,
                location VARCHAR(255),
                tags TEXT NOT NULL DEFAULT '[]',
                is_published BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_gallery_published ON gallery(is_published, event_date);
            CREATE INDEX IF NOT EXISTS idx_gallery_category ON gallery(category);
        "#,
    },
    // Migration 5: newsletter subscribers
    Migration {
        version: 5,
        name: "create_subscribers",
        up: r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        "#,
    },
];

/// Run all pending migrations against the given pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Ensure the migrations table exists
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migrations table")?;

    for migration in MIGRATIONS {
        let applied = sqlx::query("SELECT version FROM _migrations WHERE version = ?")
            .bind(migration.version)
            .fetch_optional(pool)
            .await
            .context("Failed to query applied migrations")?;

        if applied.is_some() {
            continue;
        }

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        // SQLite executes one statement per call; split on semicolons.
        for statement in migration.up.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(pool).await.with_context(|| {
                format!(
                    "Failed to apply migration {} ({})",
                    migration.version, migration.name
                )
            })?;
        }

        sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(pool)
            .await
            .context("Failed to record migration")?;
    }

    Ok(())
}

/// Current highest applied migration version, if any.
pub async fn current_version(pool: &SqlitePool) -> Result<Option<i64>> {
    let row = sqlx::query("SELECT MAX(version) AS version FROM _migrations")
        .fetch_one(pool)
        .await
        .context("Failed to query migration version")?;
    Ok(row.get("version"))
}
