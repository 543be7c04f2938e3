use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

/// GET /health — liveness plus a database round-trip.
pub async fn health_check(pool: web::Data<PgPool>) -> HttpResponse {
    let database = match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => "up",
        Err(e) => {
            tracing::error!("Health check database probe failed: {}", e);
            "down"
        }
    };

    let healthy = database == "up";
    let status = if healthy { "healthy" } else { "degraded" };

    let body = json!({
        "status": status,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    });

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
