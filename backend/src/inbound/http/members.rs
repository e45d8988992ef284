//! Member account handlers.
//!
//! ```text
//! POST /api/v1/auth/signup {"email":"sari@example.com","fullName":"Sari","password":"..."}
//! POST /api/v1/auth/login {"email":"sari@example.com","password":"..."}
//! POST /api/v1/auth/logout
//! GET /api/v1/me
//! PUT /api/v1/me/language {"language":"id"}
//! GET /api/v1/me/referrals
//! GET /api/v1/me/dashboard
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Language, LoginCredentials, SignupDetails};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{DashboardResponse, ProfileResponse, ReferralResponse, collect};
use crate::inbound::http::schemas::{ErrorSchema, LanguageSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_auth_validation_error, parse_field, require_field,
};

/// Signup request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    /// Sponsor's referral code, if the member was invited.
    pub referral_code: Option<String>,
    /// Preferred language; English when omitted.
    #[schema(value_type = Option<LanguageSchema>)]
    pub language: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Language change request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LanguageRequest {
    #[schema(value_type = LanguageSchema)]
    pub language: Option<String>,
}

fn parse_language(raw: Option<&str>) -> ApiResult<Language> {
    raw.filter(|value| !value.trim().is_empty())
        .map_or(Ok(Language::default()), |value| {
            parse_field(value, FieldName::new("language"))
        })
}

impl SignupRequest {
    fn into_details(self) -> ApiResult<SignupDetails> {
        let language = parse_language(self.language.as_deref())?;
        SignupDetails::try_from_parts(
            &self.email,
            &self.full_name,
            &self.password,
            self.referral_code.as_deref(),
            language,
        )
        .map_err(map_auth_validation_error)
    }
}

/// Register a member and sign them in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Member created", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let details = payload.into_inner().into_details()?;
    let profile = state.members.signup(details).await?;
    session.persist_member(&profile.id)?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(profile)))
}

/// Authenticate a member and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_auth_validation_error)?;
    let member = state.members.login(&credentials).await?;
    session.persist_member(&member)?;
    let profile = state.member_query.get_profile(&member).await?;
    Ok(web::Json(profile.into()))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["members"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Current member's profile.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Profile missing", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "currentProfile"
)]
#[get("/me")]
pub async fn current_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let member = session.require_member()?;
    let profile = state.member_query.get_profile(&member).await?;
    Ok(web::Json(profile.into()))
}

/// Change the language used for the site and emails.
#[utoipa::path(
    put,
    path = "/api/v1/me/language",
    request_body = LanguageRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Unsupported language", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "updateLanguage"
)]
#[put("/me/language")]
pub async fn update_language(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LanguageRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let member = session.require_member()?;
    let raw = require_field(payload.into_inner().language, FieldName::new("language"))?;
    let language = parse_field::<Language>(&raw, FieldName::new("language"))?;
    let profile = state.members.update_language(&member, language).await?;
    Ok(web::Json(profile.into()))
}

/// Members who signed up with the current member's referral code.
#[utoipa::path(
    get,
    path = "/api/v1/me/referrals",
    responses(
        (status = 200, description = "Direct referrals, newest first", body = [ReferralResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "listReferrals"
)]
#[get("/me/referrals")]
pub async fn list_referrals(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ReferralResponse>>> {
    let member = session.require_member()?;
    let referrals = state.member_query.list_referrals(&member).await?;
    Ok(web::Json(collect(referrals)))
}

/// Dashboard tallies. Storage failures yield zeroes rather than an error.
#[utoipa::path(
    get,
    path = "/api/v1/me/dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "dashboardSummary"
)]
#[get("/me/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DashboardResponse>> {
    let member = session.require_member()?;
    let summary = state.member_query.dashboard_summary(&member).await?;
    Ok(web::Json(summary.into()))
}
