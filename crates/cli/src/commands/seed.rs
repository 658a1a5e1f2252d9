//! Seed the catalog from a YAML file.
//!
//! # File format
//!
//! ```yaml
//! perfumes:
//!   - name: Bois d'Hiver
//!     description: Cedar and smoke.
//!     display_price: "$85"
//!     price: "85.00"
//!     notes: cedar, vetiver, birch tar
//!     images:
//!       - https://cdn.example.com/bois-1.jpg
//!     stock: 12
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use super::database_url;

/// Catalog file contents.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub perfumes: Vec<PerfumeSeed>,
}

/// One perfume to insert.
#[derive(Debug, Deserialize)]
pub struct PerfumeSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub display_price: String,
    pub price: Decimal,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Initial stock; no inventory record is created when absent.
    pub stock: Option<i32>,
}

/// Problems found in a catalog file before touching the database.
pub fn validate(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, perfume) in catalog.perfumes.iter().enumerate() {
        if perfume.name.trim().is_empty() {
            errors.push(format!("perfume #{index}: name is empty"));
        }
        if perfume.price.is_sign_negative() {
            errors.push(format!("{}: price is negative", perfume.name));
        }
    }
    errors
}

/// Insert every perfume in `file_path`, in one transaction.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or any insert fails (in which case nothing is inserted).
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    let errors = validate(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let database_url = database_url()?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;
    info!("Connected to database");

    let mut tx = pool.begin().await?;
    let mut images = 0usize;
    for perfume in &catalog.perfumes {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO perfumes (name, description, display_price, price, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&perfume.name)
        .bind(&perfume.description)
        .bind(&perfume.display_price)
        .bind(perfume.price)
        .bind(&perfume.notes)
        .fetch_one(&mut *tx)
        .await?;

        for (position, url) in (0_i32..).zip(&perfume.images) {
            sqlx::query("INSERT INTO perfume_images (perfume_id, url, position) VALUES ($1, $2, $3)")
                .bind(id)
                .bind(url)
                .bind(position)
                .execute(&mut *tx)
                .await?;
            images += 1;
        }

        if let Some(stock) = perfume.stock {
            sqlx::query("INSERT INTO inventory (perfume_id, quantity) VALUES ($1, $2)")
                .bind(id)
                .bind(stock)
                .execute(&mut *tx)
                .await?;
        }
    }
    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Perfumes inserted: {}", catalog.perfumes.len());
    info!("  Images inserted: {images}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog() {
        let yaml = r#"
perfumes:
  - name: Bois d'Hiver
    display_price: "$85"
    price: "85.00"
    images: [a.jpg, b.jpg]
    stock: 12
  - name: Fleur Blanche
    display_price: "$120"
    price: "120.00"
"#;
        let catalog: CatalogFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(catalog.perfumes.len(), 2);
        assert_eq!(catalog.perfumes[0].images.len(), 2);
        assert_eq!(catalog.perfumes[0].stock, Some(12));
        assert_eq!(catalog.perfumes[1].stock, None);
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn test_validate_flags_blank_name_and_negative_price() {
        let catalog = CatalogFile {
            perfumes: vec![PerfumeSeed {
                name: " ".to_string(),
                description: String::new(),
                display_price: "$-1".to_string(),
                price: Decimal::new(-100, 2),
                notes: String::new(),
                images: Vec::new(),
                stock: None,
            }],
        };
        assert_eq!(validate(&catalog).len(), 2);
    }
}
