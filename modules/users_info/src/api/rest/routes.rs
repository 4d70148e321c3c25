use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    info(title = "Users API", description = "CRUD over the in-memory user collection"),
    paths(
        handlers::list_users,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user,
    ),
    components(schemas(
        dto::UserDto,
        dto::CreateUserReq,
        dto::UpdateUserReq,
        dto::ErrorBody,
        dto::ErrorListBody,
    )),
    tags((name = "users", description = "User management"))
)]
struct UsersApiDoc;

/// OpenAPI document describing the routes registered by [`register_routes`].
pub fn openapi() -> utoipa::openapi::OpenApi {
    UsersApiDoc::openapi()
}

/// Mount the users endpoints on `router`; the service is injected per route via `Extension`.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let users = Router::new()
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(Extension(service));

    router.merge(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_all_user_operations() {
        let doc = serde_json::to_value(openapi()).expect("json");

        for (path, method, op_id) in [
            ("/users", "get", "users_info.list_users"),
            ("/users", "post", "users_info.create_user"),
            ("/users/{id}", "get", "users_info.get_user"),
            ("/users/{id}", "put", "users_info.update_user"),
            ("/users/{id}", "delete", "users_info.delete_user"),
        ] {
            let pointer = format!("/paths/{}/{}/operationId", path.replace('/', "~1"), method);
            assert_eq!(
                doc.pointer(&pointer).and_then(|v| v.as_str()),
                Some(op_id),
                "missing {method} {path}"
            );
        }

        assert!(doc.pointer("/components/schemas/UserDto").is_some());
        assert!(doc.pointer("/components/schemas/ErrorListBody").is_some());
    }

    #[test]
    fn create_documents_conflict_response() {
        let doc = serde_json::to_value(openapi()).expect("json");
        assert!(doc.pointer("/paths/~1users/post/responses/409").is_some());
        assert!(doc
            .pointer("/paths/~1users/post/responses/201/headers/Location")
            .is_some());
    }
}
