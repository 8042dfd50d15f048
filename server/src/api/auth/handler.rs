//! Authentication handlers
//!
//! Login takes a fixed delay and answers every credential failure with
//! the same message, so neither timing nor wording leaks which
//! usernames exist.

use std::time::Duration;

use axum::{Json, extract::State};
use validator::ValidateEmail;

use shared::client::{
    LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RegisterRequest, TokenPair,
    UserInfo,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{UserCreate, UserRole};
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::{
    ApiResponse, AppError, AppResult, ErrorCode, MAX_EMAIL_LEN, MAX_SHORT_TEXT_LEN, ok,
    ok_with_message, retry_transient, validate_optional_text, validate_password,
    validate_required_text,
};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/registro - self-service customer signup
pub async fn registro(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    validate_required_text(&req.username, "username", MAX_SHORT_TEXT_LEN)?;
    validate_password(&req.password)?;
    validate_optional_text(req.display_name.as_deref(), "display_name", MAX_SHORT_TEXT_LEN)?;
    if req.email.len() > MAX_EMAIL_LEN || !req.email.validate_email() {
        return Err(AppError::new(ErrorCode::InvalidFormat)
            .with_detail("field", serde_json::json!("email")));
    }

    let repo = UserRepository::new(state.get_db());

    // Specific duplicate codes; registration is not enumeration-sensitive
    if repo.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::new(ErrorCode::UsernameExists));
    }
    if repo.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailExists));
    }

    let user = repo
        .create(UserCreate {
            username: req.username,
            email: req.email,
            password: req.password,
            display_name: req.display_name,
            role: UserRole::Customer,
        })
        .await?;

    tracing::info!(username = %user.username, "User registered");
    Ok(ok_with_message(user.to_user_info(), "Usuario registrado"))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let repo = UserRepository::new(state.get_db());
    let user = repo.find_by_username(&req.username).await?;

    // Fixed delay before inspecting the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let Some(user) = user else {
        security_log!("Login failed for '{}': unknown user", req.username);
        return Err(AppError::invalid_credentials());
    };

    let password_valid = user
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
    if !password_valid {
        security_log!("Login failed for '{}': wrong password", req.username);
        return Err(AppError::invalid_credentials());
    }

    if !user.is_active {
        security_log!("Login rejected for disabled account '{}'", req.username);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let tokens = state.get_token_service().issue(&user)?;
    tracing::info!(username = %user.username, role = %user.role.as_str(), "User logged in");

    Ok(ok(LoginResponse {
        tokens,
        user: user.to_user_info(),
    }))
}

/// POST /api/auth/refresh - rotate a refresh token
///
/// The presented token is revoked before the new pair goes out, so a
/// stolen refresh token dies the moment its legitimate owner uses it.
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let token_service = state.get_token_service();
    let claims = token_service.verify_refresh(&req.refresh_token)?;

    // The account may have been disabled since the token was issued
    let repo = UserRepository::new(state.get_db());
    let user = retry_transient("load user for refresh", || repo.find_by_id(&claims.sub))
        .await?
        .ok_or_else(AppError::invalid_token)?;
    if !user.is_active {
        security_log!("Refresh rejected for disabled account '{}'", user.username);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    token_service.revoke(&req.refresh_token)?;
    let tokens = token_service.issue(&user)?;

    tracing::debug!(username = %user.username, "Refresh token rotated");
    Ok(ok(tokens))
}

/// POST /api/auth/logout - revoke the refresh token
pub async fn logout(
    State(state): State<ServerState>,
    Json(req): Json<LogoutRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.get_token_service().revoke(&req.refresh_token)?;
    Ok(ok_with_message((), "Sesion cerrada"))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let repo = UserRepository::new(state.get_db());
    let user = retry_transient("load current user", || repo.find_by_id(&current_user.id))
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NotFound))?;
    Ok(ok(user.to_user_info()))
}
