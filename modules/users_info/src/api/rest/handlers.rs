use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use tracing::{debug, info};

use crate::api::rest::dto::{CreateUserReq, ErrorBody, ErrorListBody, UpdateUserReq, UserDto};
use crate::api::rest::error::ApiError;
use crate::api::rest::validation::Validate;
use crate::domain::service::Service;

/// Ids are positive integers; anything else in the path cannot name a user.
fn user_id(path: Result<Path<u64>, PathRejection>) -> Result<u64, ApiError> {
    match path {
        Ok(Path(id)) if id > 0 => Ok(id),
        Ok(_) => Err(ApiError::NotFound),
        Err(rejection) => {
            debug!("Unparseable user id: {}", rejection.body_text());
            Err(ApiError::NotFound)
        }
    }
}

/// Unwrap a JSON body and run its rule table; malformed JSON is a validation failure too.
fn validated<T: Validate>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::Validation(vec![rejection.body_text()]))?;
    let errors = req.validate();
    if errors.is_empty() {
        Ok(req)
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    operation_id = "users_info.list_users",
    responses(
        (status = 200, description = "All users in insertion order", body = [UserDto]),
    )
)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    info!("Listing users");
    let users = svc.list_users().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    operation_id = "users_info.get_user",
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "Not Found", body = ErrorBody),
    )
)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let id = user_id(path)?;
    info!("Getting user with id: {}", id);

    let user = svc.get_user(id).await?;
    Ok(Json(UserDto::from(user)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    operation_id = "users_info.create_user",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Created user", body = UserDto,
            headers(("Location" = String, description = "URL of the new user"))),
        (status = 400, description = "Bad Request", body = ErrorListBody),
        (status = 409, description = "Conflict", body = ErrorBody),
    )
)]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    body: Result<Json<CreateUserReq>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = validated(body)?;
    debug!("Creating user: {:?}", req);

    let user = svc.create_user(req.into()).await?;
    info!("Created user {}", user.id);
    let location = format!("/users/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(UserDto::from(user)),
    ))
}

/// Update an existing user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    operation_id = "users_info.update_user",
    params(("id" = u64, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Bad Request", body = ErrorListBody),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 409, description = "Conflict", body = ErrorBody),
    )
)]
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<UpdateUserReq>, JsonRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let id = user_id(path)?;
    let req = validated(body)?;
    info!("Updating user {}", id);
    debug!("Update payload: {:?}", req);

    let user = svc.update_user(id, req.into()).await?;
    Ok(Json(UserDto::from(user)))
}

/// Delete a user by ID
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    operation_id = "users_info.delete_user",
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "Not Found", body = ErrorBody),
    )
)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = user_id(path)?;
    info!("Deleting user: {}", id);

    svc.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
