// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use bookwell::SantimPayAdapter;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use bookwell_app::config::{AppConfig, LogFormat};
use bookwell_app::db::{self, PgStore};
use bookwell_app::services::{build_http_client, Es256Signer, GeezSmsSender, SantimPayHttp};
use bookwell_app::state::AppState;
use bookwell_app::web::configure_app_routes;
use bookwell_app::{errors::AppError, jobs};

fn init_tracing(format: LogFormat) {
  let builder = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

fn startup_error(err: impl Into<AppError>) -> io::Error {
  let err = err.into();
  tracing::error!(error = %err, "Startup failed.");
  io::Error::other(err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  // LOG_FORMAT is read before the full config so that config errors are logged in the right format.
  let _ = dotenvy::dotenv();
  let format = match std::env::var("LOG_FORMAT").map(|v| v.to_ascii_lowercase()) {
    Ok(v) if v == "json" => LogFormat::Json,
    _ => LogFormat::Text,
  };
  init_tracing(format);

  tracing::info!("Starting booking server...");
  let app_config = Arc::new(AppConfig::from_env().map_err(startup_error)?);

  let pool = db::connect(&app_config).await.map_err(startup_error)?;
  let stores = PgStore::new(pool).into_stores();

  let http = build_http_client(app_config.http_timeout).map_err(startup_error)?;
  let signer = Es256Signer::from_pem(&app_config.private_key_pem).map_err(startup_error)?;
  let gateway = SantimPayAdapter::new(
    Arc::new(SantimPayHttp::new(http.clone(), &app_config.santimpay_base_url)),
    Arc::new(signer),
    app_config.gateway_config(),
  );
  let sms = GeezSmsSender::new(
    http,
    &app_config.sms_base_url,
    app_config.sms_token.clone(),
    app_config.sms_shortcode_id.clone(),
    app_config.sms_callback_url.clone(),
  );

  let app_state = AppState::new(
    stores,
    Arc::new(gateway),
    Arc::new(sms),
    app_config.notifier_config(),
    app_config.workflow_config(),
    app_config.reminder_config(),
    app_config.day_ahead_reminder_config(),
  );

  let job_handles = jobs::spawn_all(&app_state, &app_config);

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  let result = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await;

  for handle in job_handles {
    handle.abort();
  }
  tracing::info!("Server stopped.");
  result
}
