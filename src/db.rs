// =============================================================================
// DATABASE MODULE
// =============================================================================
// All PostgreSQL access: pool setup, schema bootstrap, and the two query
// builders (paginated listing, criteria filtering) plus the single-row
// lookup the listing links point at.
//
// Identifier-vs-value rule: the ORDER BY field and direction can never be
// bound as parameters, so they are interpolated only after matching a closed
// enum; every filter value travels as a bound positional parameter.
// =============================================================================

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::AppResult;
use crate::models::{
    FilterParams, Joya, JoyaLink, ListParams, ListingResponse, SortDirection, SortField,
};

/// Column list shared by every row-returning query. NUMERIC decodes as f64
/// through the float8 cast.
const JOYA_COLUMNS: &str = "id, nombre, categoria, metal, precio::float8 AS precio, stock";

// -----------------------------------------------------------------------------
// DATABASE WRAPPER
// -----------------------------------------------------------------------------
/// Wraps the SQLx connection pool and exposes typed methods for the domain
/// operations. The pool is the only shared resource; every method borrows a
/// connection per query and returns it when the query completes.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    // -------------------------------------------------------------------------
    // CONNECTION
    // -------------------------------------------------------------------------
    /// Create a new database connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .idle_timeout(std::time::Duration::from_secs(300))
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self { pool })
    }

    // -------------------------------------------------------------------------
    // SCHEMA BOOTSTRAP
    // -------------------------------------------------------------------------
    /// Create the `inventario` table if it doesn't exist and seed sample rows.
    /// Idempotent, safe to run on every startup.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inventario (
                id SERIAL PRIMARY KEY,
                nombre VARCHAR(100) NOT NULL,
                categoria VARCHAR(50) NOT NULL,
                metal VARCHAR(50) NOT NULL,
                precio NUMERIC(10, 2) NOT NULL,
                stock INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create inventario table")?;

        self.seed_sample_data().await?;

        Ok(())
    }

    /// Seed sample jewelry data when the table is empty.
    async fn seed_sample_data(&self) -> Result<()> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventario")
            .fetch_one(&self.pool)
            .await?;

        if count > 0 {
            return Ok(());
        }

        let sample_joyas = vec![
            ("Anillo solitario", "anillos", "oro", 45000.0, 4),
            ("Anillo trenzado", "anillos", "plata", 12000.0, 8),
            ("Collar de perlas", "collares", "plata", 25000.0, 3),
            ("Collar veneciano", "collares", "oro", 68000.0, 2),
            ("Aros de argolla", "aros", "plata", 9000.0, 10),
            ("Aros colgantes", "aros", "oro", 32000.0, 5),
            ("Pulsera charm", "pulseras", "plata", 15000.0, 6),
            ("Pulsera rígida", "pulseras", "oro", 54000.0, 2),
            ("Gargantilla fina", "collares", "plata", 18000.0, 7),
            ("Anillo sello", "anillos", "oro", 39000.0, 3),
            ("Aros mini", "aros", "plata", 7000.0, 12),
            ("Pulsera eslabones", "pulseras", "oro", 61000.0, 1),
        ];

        for (nombre, categoria, metal, precio, stock) in sample_joyas {
            sqlx::query(
                r#"
                INSERT INTO inventario (nombre, categoria, metal, precio, stock)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(nombre)
            .bind(categoria)
            .bind(metal)
            .bind(precio)
            .bind(stock)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // LISTING QUERY BUILDER
    // -------------------------------------------------------------------------
    /// Paginated, sorted view of the full inventory.
    ///
    /// Validates the sort before touching the database, then issues the three
    /// independent reads concurrently: total row count, aggregate stock, and
    /// the requested page. The totals always cover the whole table regardless
    /// of pagination. Rows come back as `{name, href}` links only.
    pub async fn list_joyas(&self, params: &ListParams) -> AppResult<ListingResponse> {
        // Fails before any I/O on a bad field or direction.
        let (field, direction) = params.sort()?;

        let limit = params.limit();
        let offset = params.offset();

        let page_sql = listing_page_sql(field, direction);

        let total_joyas = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM inventario")
            .fetch_one(&self.pool);
        let stock_total =
            sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(stock), 0) FROM inventario")
                .fetch_one(&self.pool);
        let page = sqlx::query_as::<_, Joya>(&page_sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool);

        let (total_joyas, stock_total, rows) = tokio::try_join!(total_joyas, stock_total, page)?;

        let results = rows.into_iter().map(JoyaLink::from).collect();

        Ok(ListingResponse {
            total_joyas,
            stock_total,
            results,
        })
    }

    // -------------------------------------------------------------------------
    // FILTER QUERY BUILDER
    // -------------------------------------------------------------------------
    /// Criteria-based subset of the inventory, unpaginated.
    ///
    /// Predicate text and bound values are accumulated together, so the
    /// placeholder ordinals always line up with the bind order. Zero active
    /// criteria return the whole table.
    pub async fn filter_joyas(&self, params: &FilterParams) -> AppResult<Vec<Joya>> {
        let FilterQuery { sql, binds } = FilterQuery::build(params);

        let mut query = sqlx::query_as::<_, Joya>(&sql);
        for bind in binds {
            query = match bind {
                BindValue::Number(v) => query.bind(v),
                BindValue::Text(s) => query.bind(s),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    // -------------------------------------------------------------------------
    // SINGLE ROW LOOKUP
    // -------------------------------------------------------------------------
    /// Fetch one row by id; the detail target of the listing's links.
    pub async fn get_joya(&self, id: i32) -> AppResult<Option<Joya>> {
        let sql = format!("SELECT {JOYA_COLUMNS} FROM inventario WHERE id = $1");
        let joya = sqlx::query_as::<_, Joya>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(joya)
    }

    // -------------------------------------------------------------------------
    // CONNECTIVITY CHECK
    // -------------------------------------------------------------------------
    /// Database clock, proving the pool can reach the server.
    pub async fn server_time(&self) -> AppResult<String> {
        let now: String = sqlx::query_scalar("SELECT NOW()::text")
            .fetch_one(&self.pool)
            .await?;

        Ok(now)
    }
}

// =============================================================================
// QUERY TEXT CONSTRUCTION
// =============================================================================
// Pure functions, separated from execution so the generated SQL and bind
// ordering are testable without a live database.

/// Page query for the listing. The field and direction literals come from the
/// validated enums; limit and offset are bound as $1/$2.
fn listing_page_sql(field: SortField, direction: SortDirection) -> String {
    format!(
        "SELECT {JOYA_COLUMNS} FROM inventario ORDER BY {} {} LIMIT $1 OFFSET $2",
        field.as_str(),
        direction.as_str()
    )
}

/// A value destined for one positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Number(f64),
    Text(String),
}

/// Assembled filter query: final SQL text plus the values to bind, in
/// placeholder order.
#[derive(Debug)]
pub struct FilterQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl FilterQuery {
    /// Collect the active criteria as ordered (predicate, value) pairs and
    /// number the placeholders from each pair's final position. Reordering
    /// the pushes below can never desynchronize ordinals and binds.
    pub fn build(params: &FilterParams) -> Self {
        let mut predicates: Vec<(&str, BindValue)> = Vec::new();

        if let Some(min) = params.precio_min() {
            predicates.push(("precio >=", BindValue::Number(min)));
        }
        if let Some(max) = params.precio_max() {
            predicates.push(("precio <=", BindValue::Number(max)));
        }
        if let Some(categoria) = params.categoria() {
            predicates.push(("categoria =", BindValue::Text(categoria.to_string())));
        }
        if let Some(metal) = params.metal() {
            predicates.push(("metal =", BindValue::Text(metal.to_string())));
        }

        let mut sql = format!("SELECT {JOYA_COLUMNS} FROM inventario");

        if !predicates.is_empty() {
            let clauses: Vec<String> = predicates
                .iter()
                .enumerate()
                .map(|(i, (condition, _))| format!("{} ${}", condition, i + 1))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let binds = predicates.into_iter().map(|(_, value)| value).collect();

        Self { sql, binds }
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn filter_params(
        precio_min: Option<&str>,
        precio_max: Option<&str>,
        categoria: Option<&str>,
        metal: Option<&str>,
    ) -> FilterParams {
        FilterParams {
            precio_min: precio_min.map(String::from),
            precio_max: precio_max.map(String::from),
            categoria: categoria.map(String::from),
            metal: metal.map(String::from),
        }
    }

    #[test]
    fn filter_without_criteria_selects_whole_table() {
        let query = FilterQuery::build(&FilterParams::default());
        assert_eq!(
            query.sql,
            format!("SELECT {JOYA_COLUMNS} FROM inventario")
        );
        assert!(query.binds.is_empty());
    }

    #[test]
    fn filter_single_criterion_binds_first_placeholder() {
        let query = FilterQuery::build(&filter_params(None, Some("500"), None, None));
        assert!(query.sql.ends_with("WHERE precio <= $1"));
        assert_eq!(query.binds, vec![BindValue::Number(500.0)]);
    }

    #[test]
    fn filter_price_and_metal_bind_as_first_and_second() {
        let query = FilterQuery::build(&filter_params(Some("100"), None, None, Some("oro")));
        assert!(query.sql.ends_with("WHERE precio >= $1 AND metal = $2"));
        assert_eq!(
            query.binds,
            vec![BindValue::Number(100.0), BindValue::Text("oro".into())]
        );
    }

    #[test]
    fn filter_ordinals_follow_position_not_field_identity() {
        // With precio absent, categoria moves up to $1.
        let query = FilterQuery::build(&filter_params(None, None, Some("anillos"), Some("plata")));
        assert!(query.sql.ends_with("WHERE categoria = $1 AND metal = $2"));
        assert_eq!(
            query.binds,
            vec![
                BindValue::Text("anillos".into()),
                BindValue::Text("plata".into())
            ]
        );
    }

    #[test]
    fn filter_all_criteria_produce_four_predicates() {
        let query = FilterQuery::build(&filter_params(
            Some("100"),
            Some("900"),
            Some("anillos"),
            Some("oro"),
        ));
        assert!(query.sql.ends_with(
            "WHERE precio >= $1 AND precio <= $2 AND categoria = $3 AND metal = $4"
        ));
        assert_eq!(query.binds.len(), 4);
    }

    #[test]
    fn filter_skips_unparseable_and_empty_values() {
        let query = FilterQuery::build(&filter_params(Some("caro"), None, Some(""), Some("oro")));
        assert!(query.sql.ends_with("WHERE metal = $1"));
        assert_eq!(query.binds, vec![BindValue::Text("oro".into())]);
    }

    #[test]
    fn listing_sql_renders_validated_literals() {
        let sql = listing_page_sql(SortField::Precio, SortDirection::Desc);
        assert_eq!(
            sql,
            format!(
                "SELECT {JOYA_COLUMNS} FROM inventario \
                 ORDER BY precio DESC LIMIT $1 OFFSET $2"
            )
        );
    }

    #[test]
    fn listing_sql_covers_every_sort_field() {
        for (field, literal) in [
            (SortField::Id, "id"),
            (SortField::Nombre, "nombre"),
            (SortField::Categoria, "categoria"),
            (SortField::Metal, "metal"),
            (SortField::Precio, "precio"),
            (SortField::Stock, "stock"),
        ] {
            let sql = listing_page_sql(field, SortDirection::Asc);
            assert!(sql.contains(&format!("ORDER BY {literal} ASC")));
        }
    }
}
