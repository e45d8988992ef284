//! Public path normalisation for the bilingual site.
//!
//! ```text
//! GET /api/v1/paths/normalize?path=/en/en/market
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Language, needs_redirect, normalize_public_path};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, LanguageSchema};
use crate::inbound::http::validation::{FieldName, missing_field_error};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NormalizeQuery {
    /// Raw pathname, optionally with a query string.
    pub path: Option<String>,
}

/// Canonical form of a pathname.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPathResponse {
    #[schema(example = "/en/market")]
    pub canonical: String,
    #[schema(value_type = LanguageSchema)]
    pub language: Language,
    /// The alternate-language URL for the same page.
    #[schema(example = "/id/market")]
    pub alternate: String,
    /// Whether the client should redirect to `canonical`.
    pub redirect: bool,
}

/// Normalise a public pathname.
#[utoipa::path(
    get,
    path = "/api/v1/paths/normalize",
    params(NormalizeQuery),
    responses(
        (status = 200, description = "Canonical path", body = NormalizedPathResponse),
        (status = 400, description = "Missing path", body = ErrorSchema)
    ),
    tags = ["paths"],
    operation_id = "normalizePath",
    security([])
)]
#[get("/paths/normalize")]
pub async fn normalize(
    query: web::Query<NormalizeQuery>,
) -> ApiResult<web::Json<NormalizedPathResponse>> {
    let raw = query
        .into_inner()
        .path
        .ok_or_else(|| missing_field_error(FieldName::new("path")))?;
    let normalized = normalize_public_path(&raw);
    let alternate = match normalized.language() {
        Language::En => normalized.with_language(Language::Id),
        Language::Id => normalized.with_language(Language::En),
    };
    Ok(web::Json(NormalizedPathResponse {
        canonical: normalized.canonical().to_owned(),
        language: normalized.language(),
        alternate,
        redirect: needs_redirect(&raw),
    }))
}
