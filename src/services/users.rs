use uuid::Uuid;

use crate::{
    config::{AdminAccount, Config},
    error::{AppError, AppResult},
    models::{
        CreateUserRequest, LoginRequest, LoginResponse, NewUser, RegisterRequest, Registration,
        Role, User,
    },
    store::{Store, UserStore},
    utils::{create_token, hash_password, verify_password},
};

/// Public sign-up. The account is always `Staff`.
pub async fn register(store: &dyn Store, request: RegisterRequest) -> AppResult<User> {
    create_account(store, request.validate()?, Role::Staff).await
}

/// Account creation by an Admin, with any role.
pub async fn create_user(store: &dyn Store, request: CreateUserRequest) -> AppResult<User> {
    let role = request.role;
    create_account(store, request.account.validate()?, role).await
}

/// Seeds the configured Admin. An existing account with that email is left as is.
pub async fn ensure_admin(store: &dyn Store, admin: &AdminAccount) -> AppResult<Option<User>> {
    let registration = RegisterRequest {
        name: Some(admin.name.clone()),
        email: Some(admin.email.clone()),
        password: Some(admin.password.clone()),
    }
    .validate()?;

    if store.find_user_by_email(&registration.email).await?.is_some() {
        log::info!("Admin account {} already present", registration.email);
        return Ok(None);
    }
    create_account(store, registration, Role::Admin).await.map(Some)
}

async fn create_account(store: &dyn Store, registration: Registration, role: Role) -> AppResult<User> {
    if store.find_user_by_email(&registration.email).await?.is_some() {
        return Err(AppError::duplicate_email());
    }

    let password = registration.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let user = store
        .insert_user(NewUser {
            name: registration.name,
            email: registration.email,
            password_hash,
            role,
        })
        .await?;
    log::info!("User {} created as {}", user.email, user.role);
    Ok(user)
}

pub async fn login(
    store: &dyn Store,
    config: &Config,
    request: LoginRequest,
) -> AppResult<LoginResponse> {
    let user = store
        .find_user_by_email(&request.email.trim().to_lowercase())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let password = request.password;
    let password_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    let token = create_token(
        &config.jwt_secret,
        user.id,
        user.email.clone(),
        user.role,
        config.token_ttl_hours,
    )?;
    Ok(LoginResponse { token, user })
}

pub async fn get_user(store: &dyn Store, id: Uuid) -> AppResult<User> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
