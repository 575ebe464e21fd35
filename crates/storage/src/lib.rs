use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use shared::domain::{Product, ProductId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        // Concurrent writers wait on SQLite's write lock instead of failing.
        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        // Every in-memory connection is its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT id, name FROM products ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(product_from_row).collect())
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name FROM products WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(product_from_row))
    }

    /// Inserts a product under the next free id (`max(id) + 1`, starting at 1).
    ///
    /// The id lookup and the insert are one statement, so SQLite takes the
    /// write lock before reading `max(id)`. Concurrent creates are serialized
    /// and never race for the same id.
    pub async fn create_product(&self, name: &str) -> Result<Product> {
        let row = sqlx::query(
            "INSERT INTO products (id, name)
             VALUES ((SELECT COALESCE(MAX(id), 0) + 1 FROM products), ?)
             RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert product")?;
        Ok(product_from_row(&row))
    }

    pub async fn update_product(&self, id: ProductId, name: &str) -> Result<Option<Product>> {
        let row = sqlx::query(
            "UPDATE products SET name = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?
             RETURNING id, name",
        )
        .bind(name)
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update product {id}"))?;
        Ok(row.as_ref().map(product_from_row))
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete product {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn product_from_row(row: &SqliteRow) -> Product {
    Product {
        id: ProductId(row.get::<i64, _>(0)),
        name: row.get::<String, _>(1),
    }
}

/// Turns a bare file path or a `sqlite:path` url into a `sqlite://` url.
/// Urls that already carry a scheme, and in-memory urls, pass through.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();
    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url);
    format!("sqlite://{}", path.replace('\\', "/"))
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
