use std::sync::Arc;

use crate::{
    domain::{
        models::user::{Role, User},
        repositories::{credential_repository::CredentialRepository, user_repository::UserRepository},
        services::{password_service::PasswordHasher, token_service::TokenService},
    },
    presentation::{
        error::ApiError,
        extractors::{AuthenticatedUser, FormBody, JsonBody, TokenVerifier},
    },
    usecase::{login_usecase::LoginUsecase, register_user_usecase::RegisterUserUsecase},
};
use axum::{
    Json, Router,
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Request

/// form for login request
#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// json for register request
#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

// Response

/// json for login and refresh response
#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// public view of an account; the password hash never leaves the server
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id().value(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            role: user.role(),
            created_at: user.created_at(),
        }
    }
}

/* Router Function and Handler Function */

// Auth Router

/// function return Router object
/// Suppose to be nested under `/auth` by main router
pub fn create_auth_router<
    C: CredentialRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    P: PasswordHasher + Send + Sync + 'static,
    T: TokenService + 'static,
>(
    login_service: LoginUsecase<C, U, P, T>,
    register_service: RegisterUserUsecase<U, P>,
    verifier: TokenVerifier,
) -> Router {
    let state = AuthState {
        login_service: Arc::new(login_service),
        register_service: Arc::new(register_service),
        verifier,
    };

    Router::new()
        .route("/register", post(register::<C, U, P, T>))
        .route("/login", post(login::<C, U, P, T>))
        .route("/me", get(me::<C, U, P, T>))
        .route("/refresh", post(refresh::<C, U, P, T>))
        .with_state(state)
}

pub struct AuthState<C: CredentialRepository, U: UserRepository, P: PasswordHasher, T: TokenService> {
    pub login_service: Arc<LoginUsecase<C, U, P, T>>,
    pub register_service: Arc<RegisterUserUsecase<U, P>>,
    pub verifier: TokenVerifier,
}

impl<C: CredentialRepository, U: UserRepository, P: PasswordHasher, T: TokenService> Clone
    for AuthState<C, U, P, T>
{
    fn clone(&self) -> Self {
        Self {
            login_service: Arc::clone(&self.login_service),
            register_service: Arc::clone(&self.register_service),
            verifier: self.verifier.clone(),
        }
    }
}

impl<C: CredentialRepository, U: UserRepository, P: PasswordHasher, T: TokenService>
    FromRef<AuthState<C, U, P, T>> for TokenVerifier
{
    fn from_ref(state: &AuthState<C, U, P, T>) -> Self {
        state.verifier.clone()
    }
}

// handler function

/// handler function for register
///
/// Open to anonymous callers for STUDENT accounts; other roles need an ADMIN bearer token.
async fn register<
    C: CredentialRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
    T: TokenService,
>(
    State(state): State<AuthState<C, U, P, T>>,
    caller: Option<AuthenticatedUser>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    let caller = caller.map(|AuthenticatedUser(identity)| identity);
    let user = state
        .register_service
        .create_user(
            payload.username,
            &payload.email,
            &payload.password,
            payload.role,
            caller.as_ref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// handler function for login
async fn login<
    C: CredentialRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
    T: TokenService,
>(
    State(state): State<AuthState<C, U, P, T>>,
    FormBody(payload): FormBody<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state
        .login_service
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// handler function for the caller's own account
async fn me<
    C: CredentialRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
    T: TokenService,
>(
    State(state): State<AuthState<C, U, P, T>>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<UserInfo>, ApiError> {
    let user = state.login_service.current_user(&identity).await?;
    Ok(Json(user.into()))
}

/// handler function for swapping a valid token for a fresh one
async fn refresh<
    C: CredentialRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PasswordHasher + Send + Sync,
    T: TokenService,
>(
    State(state): State<AuthState<C, U, P, T>>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.login_service.refresh(&identity).await?;
    Ok(Json(TokenResponse::bearer(token)))
}
