// =============================================================================
// MODELS MODULE
// =============================================================================
// Data structures shared across the service: the inventory row type, the
// query-string parameter types (with their normalization rules), the closed
// sort enums, and the response shapes.
// =============================================================================

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;

// =============================================================================
// INVENTORY ROW
// =============================================================================
/// One row of the `inventario` table.
///
/// `precio` is stored as NUMERIC(10,2); queries select it with a `::float8`
/// cast so it decodes as `f64`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Joya {
    pub id: i32,
    pub nombre: String,
    pub categoria: String,
    pub metal: String,
    pub precio: f64,
    pub stock: i32,
}

// =============================================================================
// SORT WHITELIST
// =============================================================================
// ORDER BY identifiers cannot be bound as query parameters, so the sortable
// field and direction are validated against closed enums and only the matched
// literal is ever interpolated into SQL.

/// Columns the listing endpoint may sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Nombre,
    Categoria,
    Metal,
    Precio,
    Stock,
}

impl SortField {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "id" => Ok(Self::Id),
            "nombre" => Ok(Self::Nombre),
            "categoria" => Ok(Self::Categoria),
            "metal" => Ok(Self::Metal),
            "precio" => Ok(Self::Precio),
            "stock" => Ok(Self::Stock),
            other => Err(AppError::Validation(format!(
                "invalid sort field: {other}"
            ))),
        }
    }

    /// SQL literal for this field. Only these exact strings reach the query.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Nombre => "nombre",
            Self::Categoria => "categoria",
            Self::Metal => "metal",
            Self::Precio => "precio",
            Self::Stock => "stock",
        }
    }
}

/// Sort direction, case-insensitive on input, rendered uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(AppError::Validation(format!(
                "invalid sort direction: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

// =============================================================================
// LISTING PARAMETERS
// =============================================================================
/// Query parameters for the listing endpoint.
///
/// All three arrive as raw strings: `limit` and `page` normalize silently to
/// their defaults when missing, non-numeric, or non-positive, while a
/// malformed `order_by` is a hard validation failure.
///
/// # Example
/// GET /joyas?limit=5&page=2&order_by=precio_DESC
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub order_by: Option<String>,
}

const DEFAULT_LIMIT: i64 = 10;
const DEFAULT_PAGE: i64 = 1;
const DEFAULT_ORDER_BY: &str = "id_ASC";

impl ListParams {
    /// Rows per page; defaults to 10 when absent or not a positive integer.
    pub fn limit(&self) -> i64 {
        normalize_positive(self.limit.as_deref(), DEFAULT_LIMIT)
    }

    /// 1-indexed page number; defaults to 1 when absent or not positive.
    pub fn page(&self) -> i64 {
        normalize_positive(self.page.as_deref(), DEFAULT_PAGE)
    }

    /// Rows to skip for the requested page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Split `order_by` on the first underscore and validate both halves
    /// against the whitelists. Must run before any query is issued.
    pub fn sort(&self) -> Result<(SortField, SortDirection), AppError> {
        let raw = self.order_by.as_deref().unwrap_or(DEFAULT_ORDER_BY);
        let (field, direction) = raw.split_once('_').ok_or_else(|| {
            AppError::Validation(format!("invalid order_by: {raw}"))
        })?;
        Ok((SortField::parse(field)?, SortDirection::parse(direction)?))
    }
}

fn normalize_positive(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

// =============================================================================
// FILTER PARAMETERS
// =============================================================================
/// Query parameters for the filter endpoint. Every field is optional; an
/// absent, empty, or (for prices) unparseable value contributes no predicate.
///
/// # Example
/// GET /joyas/filtros?precio_min=100&metal=oro
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub precio_min: Option<String>,
    pub precio_max: Option<String>,
    pub categoria: Option<String>,
    pub metal: Option<String>,
}

impl FilterParams {
    pub fn precio_min(&self) -> Option<f64> {
        self.precio_min.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn precio_max(&self) -> Option<f64> {
        self.precio_max.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn categoria(&self) -> Option<&str> {
        self.categoria.as_deref().filter(|s| !s.is_empty())
    }

    pub fn metal(&self) -> Option<&str> {
        self.metal.as_deref().filter(|s| !s.is_empty())
    }
}

// =============================================================================
// RESPONSE SHAPES
// =============================================================================

/// HATEOAS link for one inventory row: display name plus the navigable path
/// to its detail representation, instead of the full record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoyaLink {
    pub name: String,
    pub href: String,
}

impl From<Joya> for JoyaLink {
    fn from(joya: Joya) -> Self {
        Self {
            href: format!("/joyas/joya/{}", joya.id),
            name: joya.nombre,
        }
    }
}

/// Listing response: collection-wide totals plus one page of links.
///
/// # Example JSON
/// ```json
/// {
///   "totalJoyas": 12,
///   "stockTotal": 53,
///   "results": [{ "name": "Anillo solitario", "href": "/joyas/joya/1" }]
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
    #[serde(rename = "totalJoyas")]
    pub total_joyas: i64,
    #[serde(rename = "stockTotal")]
    pub stock_total: i64,
    pub results: Vec<JoyaLink>,
}

/// Liveness response for `/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Connectivity response for `/`: echoes the database clock.
#[derive(Debug, Serialize)]
pub struct ConnectionCheckResponse {
    pub status: String,
    pub timestamp: String,
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn list_params(limit: Option<&str>, page: Option<&str>, order_by: Option<&str>) -> ListParams {
        ListParams {
            limit: limit.map(String::from),
            page: page.map(String::from),
            order_by: order_by.map(String::from),
        }
    }

    #[test]
    fn limit_and_page_default_when_absent() {
        let params = ListParams::default();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn limit_and_page_default_when_not_numeric() {
        let params = list_params(Some("abc"), Some("x1"), None);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn limit_and_page_default_when_not_positive() {
        let params = list_params(Some("0"), Some("-3"), None);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        let params = list_params(Some("10"), Some("3"), None);
        assert_eq!(params.offset(), 20);

        let params = list_params(Some("5"), Some("2"), None);
        assert_eq!(params.offset(), 5);

        let params = ListParams::default();
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn sort_defaults_to_id_ascending() {
        let (field, direction) = ListParams::default().sort().unwrap();
        assert_eq!(field, SortField::Id);
        assert_eq!(direction, SortDirection::Asc);
    }

    #[test]
    fn sort_splits_on_first_underscore() {
        let params = list_params(None, None, Some("precio_DESC"));
        let (field, direction) = params.sort().unwrap();
        assert_eq!(field, SortField::Precio);
        assert_eq!(direction, SortDirection::Desc);
    }

    #[test]
    fn sort_direction_is_case_insensitive() {
        for raw in ["stock_asc", "stock_Asc", "stock_ASC"] {
            let params = list_params(None, None, Some(raw));
            let (_, direction) = params.sort().unwrap();
            assert_eq!(direction, SortDirection::Asc);
        }
        let params = list_params(None, None, Some("stock_desc"));
        assert_eq!(params.sort().unwrap().1, SortDirection::Desc);
    }

    #[test]
    fn sort_rejects_unknown_field() {
        let params = list_params(None, None, Some("password_ASC"));
        assert!(matches!(params.sort(), Err(AppError::Validation(_))));
    }

    #[test]
    fn sort_rejects_unknown_direction() {
        let params = list_params(None, None, Some("precio_SIDEWAYS"));
        assert!(matches!(params.sort(), Err(AppError::Validation(_))));
    }

    #[test]
    fn sort_rejects_missing_underscore() {
        let params = list_params(None, None, Some("precio"));
        assert!(matches!(params.sort(), Err(AppError::Validation(_))));
    }

    #[test]
    fn every_sort_field_round_trips_through_parse() {
        for name in ["id", "nombre", "categoria", "metal", "precio", "stock"] {
            assert_eq!(SortField::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn filter_prices_skip_unparseable_values() {
        let params = FilterParams {
            precio_min: Some("100.5".into()),
            precio_max: Some("cheap".into()),
            ..Default::default()
        };
        assert_eq!(params.precio_min(), Some(100.5));
        assert_eq!(params.precio_max(), None);
    }

    #[test]
    fn filter_strings_skip_empty_values() {
        let params = FilterParams {
            categoria: Some(String::new()),
            metal: Some("oro".into()),
            ..Default::default()
        };
        assert_eq!(params.categoria(), None);
        assert_eq!(params.metal(), Some("oro"));
    }

    #[test]
    fn link_points_at_detail_path() {
        let joya = Joya {
            id: 7,
            nombre: "Collar de perlas".into(),
            categoria: "collares".into(),
            metal: "plata".into(),
            precio: 250.0,
            stock: 3,
        };
        let link = JoyaLink::from(joya);
        assert_eq!(link.name, "Collar de perlas");
        assert_eq!(link.href, "/joyas/joya/7");
    }

    #[test]
    fn listing_response_uses_api_field_names() {
        let response = ListingResponse {
            total_joyas: 12,
            stock_total: 53,
            results: vec![],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["totalJoyas"], 12);
        assert_eq!(json["stockTotal"], 53);
        assert!(json["results"].as_array().unwrap().is_empty());
    }
}
