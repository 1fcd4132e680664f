// tests/appointment_tests.rs
mod common;

use bookwell::domain::{AppointmentStatus, NewAppointment};
use bookwell::{AppointmentService, BookingError};
use chrono::{TimeZone, Utc};
use common::*;
use serial_test::serial;
use uuid::Uuid;

fn new_appointment(h: &Harness) -> NewAppointment {
  NewAppointment {
    customer_id: h.customer.id,
    date_time: Utc.with_ymd_and_hms(2024, 6, 1, 6, 30, 0).unwrap(),
    hospital_name: "St. Paul".to_string(),
  }
}

#[tokio::test]
#[serial]
async fn create_persists_pending_and_notifies() {
  setup_tracing();
  let h = Harness::new();
  let service = AppointmentService::new(h.stores.clone(), h.notifier.clone());

  let created = service.create(new_appointment(&h)).await.expect("created");

  assert_eq!(created.status, AppointmentStatus::Pending);
  assert!(!created.reminder_sent);
  let sent = h.sms.sent();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].0, NORMALIZED_PHONE);
  assert!(sent[0].1.contains("June 1st 2024, 9:30 am"));
}

#[tokio::test]
#[serial]
async fn create_validates_input() {
  setup_tracing();
  let h = Harness::new();
  let service = AppointmentService::new(h.stores.clone(), h.notifier.clone());

  let mut short_name = new_appointment(&h);
  short_name.hospital_name = "X".to_string();
  assert!(matches!(service.create(short_name).await, Err(BookingError::Validation(_))));

  let mut stranger = new_appointment(&h);
  stranger.customer_id = Uuid::new_v4();
  assert!(matches!(
    service.create(stranger).await,
    Err(BookingError::NotFound { entity: "customer", .. })
  ));
  assert!(h.sms.sent().is_empty());
}

#[tokio::test]
#[serial]
async fn create_succeeds_when_sms_fails() {
  setup_tracing();
  let h = Harness::new();
  h.sms.set_failing(true);
  let service = AppointmentService::new(h.stores.clone(), h.notifier.clone());

  let created = service.create(new_appointment(&h)).await.expect("created");

  assert!(h.store.appointment(created.id).is_some());
}

#[tokio::test]
#[serial]
async fn status_changes_follow_transition_table_and_notify() {
  setup_tracing();
  let h = Harness::new();
  let service = AppointmentService::new(h.stores.clone(), h.notifier.clone());
  let created = service.create(new_appointment(&h)).await.expect("created");

  let confirmed = service
    .update_status(created.id, AppointmentStatus::Confirmed)
    .await
    .expect("confirm");
  assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
  assert_eq!(h.sms.count_containing("is confirmed"), 1);

  // Same status again changes nothing and sends nothing.
  service
    .update_status(created.id, AppointmentStatus::Confirmed)
    .await
    .expect("reconfirm");
  assert_eq!(h.sms.count_containing("is confirmed"), 1);

  let completed = service
    .update_status(created.id, AppointmentStatus::Completed)
    .await
    .expect("complete");
  assert_eq!(completed.status, AppointmentStatus::Completed);
  assert_eq!(h.sms.count_containing("is complete"), 1);

  let err = service
    .update_status(created.id, AppointmentStatus::Pending)
    .await
    .unwrap_err();
  assert!(matches!(err, BookingError::InvalidTransition { entity: "appointment", .. }));
}

#[tokio::test]
#[serial]
async fn rejection_sends_rejection_message() {
  setup_tracing();
  let h = Harness::new();
  let service = AppointmentService::new(h.stores.clone(), h.notifier.clone());
  let created = service.create(new_appointment(&h)).await.expect("created");

  service
    .update_status(created.id, AppointmentStatus::Rejected)
    .await
    .expect("reject");

  assert_eq!(h.sms.count_containing("has been rejected"), 1);
  assert!(matches!(
    service.get(Uuid::new_v4()).await,
    Err(BookingError::NotFound { entity: "appointment", .. })
  ));
}
