// server/src/web/response.rs

//! `{success, message?, data}` envelope shared by every handler.

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<&'static str>,
  pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
  HttpResponse::Ok().json(Envelope {
    success: true,
    message: None,
    data,
  })
}

pub fn ok_with<T: Serialize>(message: &'static str, data: T) -> HttpResponse {
  HttpResponse::Ok().json(Envelope {
    success: true,
    message: Some(message),
    data,
  })
}

pub fn created<T: Serialize>(message: &'static str, data: T) -> HttpResponse {
  HttpResponse::Created().json(Envelope {
    success: true,
    message: Some(message),
    data,
  })
}
