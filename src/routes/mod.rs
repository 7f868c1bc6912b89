use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::config::AppState;
use crate::handlers::{
    add_item, advance_to_front, complete_purchase, filter_users, find_by_position, get_user,
    health_check, join_queue, leave_queue, list_purchases, list_queue, list_users, login,
    my_purchases, register, update_user,
};
use crate::middleware::JwtMiddleware;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    // Health check route (outside /api)
    let health_routes = Router::new()
        .route("/health", get(health_check));

    // Public API routes (no authentication required)
    let public_routes = Router::new()
        .route("/usuarios", post(register))
        .route("/usuarios/login", post(login))
        .route("/fila", get(list_queue))
        .route("/fila/:pos", get(find_by_position));

    // Protected API routes (authentication required)
    let protected_routes = Router::new()
        .route("/usuarios", get(list_users))
        .route("/usuarios/filtro", get(filter_users))
        .route("/usuarios/:id", get(get_user).patch(update_user))
        .route("/fila/entrar", post(join_queue))
        .route("/fila/pedido/:item", post(add_item))
        .route("/fila/avancar/:usuario_id", patch(advance_to_front))
        .route("/fila/concluir/:usuario_id", patch(complete_purchase))
        .route("/fila/sair/:usuario_id", delete(leave_queue))
        .route("/compras", get(list_purchases))
        .route("/compras/minhas", get(my_purchases))
        .route_layer(middleware::from_fn_with_state(state.clone(), JwtMiddleware::auth));

    // Combine routes
    Router::new()
        .merge(health_routes)  // Health check at /health
        .nest("/api", Router::new()
            .merge(public_routes)
            .merge(protected_routes)
        )
        .with_state(state)
}
