// tests/reminder_tests.rs
mod common;

use bookwell::domain::{Appointment, AppointmentStatus, OrderStatus, ServiceType};
use bookwell::{offset_from_minutes, ReminderConfig, ReminderResult, ReminderScheduler, ReminderTarget, ReminderWindow};
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::*;
use serial_test::serial;
use std::sync::Arc;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap()
}

fn scheduler(h: &Harness, window: ReminderWindow) -> ReminderScheduler {
  ReminderScheduler::new(
    h.stores.clone(),
    h.notifier.clone(),
    ReminderConfig {
      window,
      local_offset: offset_from_minutes(180),
    },
  )
}

fn seed_appointment(h: &Harness, status: AppointmentStatus, date_time: DateTime<Utc>) -> Uuid {
  let appointment = Appointment {
    id: Uuid::new_v4(),
    customer_id: h.customer.id,
    date_time,
    hospital_name: "St. Paul".to_string(),
    status,
    reminder_sent: false,
    follow_up_sent: false,
    created_at: now() - Duration::days(7),
  };
  let id = appointment.id;
  h.store.put_appointment(appointment);
  id
}

#[tokio::test]
#[serial]
async fn appointment_on_window_boundary_is_reminded_once() {
  setup_tracing();
  let h = Harness::new();
  let on_boundary = seed_appointment(&h, AppointmentStatus::Confirmed, now() + Duration::hours(24));
  let past_boundary = seed_appointment(
    &h,
    AppointmentStatus::Confirmed,
    now() + Duration::hours(24) + Duration::seconds(1),
  );
  let reminders = scheduler(&h, ReminderWindow::Within(Duration::hours(24)));

  let first = reminders.run_due_reminders(now()).await.expect("first run");
  assert_eq!(first.len(), 1);
  assert_eq!(first[0].target, ReminderTarget::Appointment(on_boundary));
  assert_eq!(first[0].result, ReminderResult::Sent);
  assert!(h.store.appointment(on_boundary).unwrap().reminder_sent);
  assert!(!h.store.appointment(past_boundary).unwrap().reminder_sent);

  let second = reminders.run_due_reminders(now()).await.expect("second run");
  assert!(second.is_empty());
  assert_eq!(h.sms.count_containing("Reminder:"), 1);
}

#[tokio::test]
#[serial]
async fn only_confirmed_appointments_get_reminders() {
  setup_tracing();
  let h = Harness::new();
  seed_appointment(&h, AppointmentStatus::Pending, now() + Duration::hours(2));
  seed_appointment(&h, AppointmentStatus::Cancelled, now() + Duration::hours(2));
  let reminders = scheduler(&h, ReminderWindow::Within(Duration::hours(24)));

  assert!(reminders.run_due_reminders(now()).await.expect("run").is_empty());
  assert!(h.sms.sent().is_empty());
}

#[tokio::test]
#[serial]
async fn failed_send_releases_claim_for_next_run() {
  setup_tracing();
  let h = Harness::new();
  let id = seed_appointment(&h, AppointmentStatus::Confirmed, now() + Duration::hours(3));
  let reminders = scheduler(&h, ReminderWindow::Within(Duration::hours(24)));

  h.sms.set_failing(true);
  let failed = reminders.run_due_reminders(now()).await.expect("run");
  assert!(matches!(failed[0].result, ReminderResult::Failed(_)));
  assert!(!h.store.appointment(id).unwrap().reminder_sent);

  h.sms.set_failing(false);
  let retried = reminders.run_due_reminders(now()).await.expect("run");
  assert_eq!(retried[0].result, ReminderResult::Sent);
  assert!(h.store.appointment(id).unwrap().reminder_sent);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn overlapping_runs_never_double_send() {
  setup_tracing();
  let h = Harness::new();
  for hour in 1..=10 {
    seed_appointment(&h, AppointmentStatus::Confirmed, now() + Duration::hours(hour));
  }
  let reminders = Arc::new(scheduler(&h, ReminderWindow::Within(Duration::hours(24))));

  let mut runs = Vec::new();
  for _ in 0..4 {
    let reminders = reminders.clone();
    runs.push(tokio::spawn(async move { reminders.run_due_reminders(now()).await }));
  }
  let mut sent = 0;
  for run in runs {
    let outcomes = run.await.expect("joined").expect("run");
    sent += outcomes.iter().filter(|o| o.result == ReminderResult::Sent).count();
  }

  assert_eq!(sent, 10);
  assert_eq!(h.sms.sent().len(), 10);
}

#[tokio::test]
#[serial]
async fn days_ahead_window_covers_whole_local_day() {
  setup_tracing();
  let h = Harness::new();
  // 01:00 local on June 2nd.
  let early_tomorrow = seed_appointment(&h, AppointmentStatus::Confirmed, Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap());
  // 23:00 local on June 1st.
  seed_appointment(&h, AppointmentStatus::Confirmed, Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap());
  let reminders = scheduler(&h, ReminderWindow::DaysAhead(1));

  let (from, to) = reminders.window_bounds(now());
  assert_eq!(from, Utc.with_ymd_and_hms(2024, 6, 1, 21, 0, 0).unwrap());
  assert!(to < Utc.with_ymd_and_hms(2024, 6, 2, 21, 0, 0).unwrap());

  let outcomes = reminders.run_due_reminders(now()).await.expect("run");
  assert_eq!(outcomes.len(), 1);
  assert_eq!(outcomes[0].target, ReminderTarget::Appointment(early_tomorrow));
}

#[tokio::test]
#[serial]
async fn paid_orders_dated_in_window_are_reminded() {
  setup_tracing();
  let h = Harness::new();
  let paid = h.order(ServiceType::Fixed, Some(date(2024, 6, 2)), None).await;
  h.store.put_order(bookwell::domain::Order {
    status: OrderStatus::Paid,
    ..paid.clone()
  });
  h.order(ServiceType::Fixed, Some(date(2024, 6, 2)), None).await;
  let reminders = scheduler(&h, ReminderWindow::Within(Duration::hours(24)));

  let outcomes = reminders.run_due_reminders(now()).await.expect("run");

  assert_eq!(outcomes.len(), 1);
  assert_eq!(outcomes[0].target, ReminderTarget::Order(paid.id));
  let sent = h.sms.sent();
  assert!(sent[0].1.contains("Sunrise Hall"));
  assert!(sent[0].1.contains("June 2nd 2024"));
  assert!(h.store.order(paid.id).unwrap().reminder_sent);
}

#[tokio::test]
#[serial]
async fn follow_ups_cover_previous_local_day_once() {
  setup_tracing();
  let h = Harness::new();
  let next_morning = Utc.with_ymd_and_hms(2024, 6, 2, 6, 0, 0).unwrap();
  let completed = seed_appointment(&h, AppointmentStatus::Completed, Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap());
  seed_appointment(&h, AppointmentStatus::Confirmed, Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
  seed_appointment(&h, AppointmentStatus::Completed, Utc.with_ymd_and_hms(2024, 5, 30, 8, 0, 0).unwrap());
  let reminders = scheduler(&h, ReminderWindow::Within(Duration::hours(24)));

  let outcomes = reminders.run_follow_ups(next_morning).await.expect("run");
  assert_eq!(outcomes.len(), 1);
  assert_eq!(outcomes[0].target, ReminderTarget::Appointment(completed));
  assert!(h.store.appointment(completed).unwrap().follow_up_sent);

  assert!(reminders.run_follow_ups(next_morning).await.expect("rerun").is_empty());
  assert_eq!(h.sms.count_containing("Thank you for your appointment"), 1);
}
