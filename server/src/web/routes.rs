// server/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{appointment_handlers, order_handlers, payment_handlers, webhook_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts the booking API under `/api/v1`.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route(
            "/{order_id}/reservation",
            web::get().to(order_handlers::get_order_reservation_handler),
          ),
      )
      .service(
        web::scope("/payments")
          .route("/initiate", web::post().to(payment_handlers::initiate_payment_handler))
          .route(
            "/verify/{reference}",
            web::get().to(payment_handlers::verify_payment_handler),
          )
          .route(
            "/{reference}/refresh",
            web::post().to(payment_handlers::refresh_payment_handler),
          ),
      )
      .service(
        web::scope("/webhooks").route(
          "/{provider}",
          web::post().to(webhook_handlers::payment_webhook_handler),
        ),
      )
      .service(
        web::scope("/appointments")
          .route("", web::post().to(appointment_handlers::create_appointment_handler))
          .route(
            "/{appointment_id}",
            web::get().to(appointment_handlers::get_appointment_handler),
          )
          .route(
            "/{appointment_id}/status",
            web::patch().to(appointment_handlers::update_appointment_status_handler),
          ),
      ),
  );
}
