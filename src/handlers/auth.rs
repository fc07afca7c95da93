use axum::{extract::State, http::StatusCode, response::Json};
use axum_extra::extract::WithRejection;
use tower_cookies::{Cookie, Cookies};

use crate::{
    error::{AppError, AppResult},
    handlers::{data, with_message, Envelope},
    middleware::{AdminOnly, CurrentUser, AUTH_COOKIE},
    models::{CreateUserRequest, LoginRequest, LoginResponse, RegisterRequest, User},
    services::users as service,
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Envelope<User>>)> {
    let user = service::register(state.store.as_ref(), body).await?;
    Ok((
        StatusCode::CREATED,
        with_message("User registered successfully", user),
    ))
}

pub async fn create_user(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<CreateUserRequest>, AppError>,
) -> AppResult<(StatusCode, Json<Envelope<User>>)> {
    let user = service::create_user(state.store.as_ref(), body).await?;
    log::info!("{} created account {} ({})", admin.email, user.email, user.role);
    Ok((
        StatusCode::CREATED,
        with_message("User created successfully", user),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AppResult<Json<Envelope<LoginResponse>>> {
    let session = service::login(state.store.as_ref(), &state.config, body).await?;

    // HTTP-only cookie for browser clients; API clients use the returned token.
    let cookie = Cookie::build((AUTH_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(state.config.token_ttl_hours))
        .build();
    cookies.add(cookie);

    Ok(with_message("Login successful", session))
}

pub async fn me(user: CurrentUser, State(state): State<AppState>) -> AppResult<Json<Envelope<User>>> {
    Ok(data(service::get_user(state.store.as_ref(), user.id).await?))
}
