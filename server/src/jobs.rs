// server/src/jobs.rs

//! Periodic background work: hourly and day-ahead reminders, follow-ups and
//! the fulfillment sweep.
//!
//! Each loop runs on its own task; a failed iteration is logged and the loop
//! waits for the next tick.

use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, Instrument};

use crate::config::AppConfig;
use crate::state::AppState;

/// Completed payments re-examined per sweep.
const SWEEP_BATCH: usize = 100;

fn spawn_loop<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> JoinHandle<()>
where
  F: FnMut() -> Fut + Send + 'static,
  Fut: Future<Output = ()> + Send + 'static,
{
  tokio::spawn(
    async move {
      let mut ticker = interval(period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
      info!(period_secs = period.as_secs(), "Background job started.");
      loop {
        ticker.tick().await;
        tick().await;
      }
    }
    .instrument(tracing::info_span!("job", name)),
  )
}

pub fn spawn_all(state: &AppState, config: &AppConfig) -> Vec<JoinHandle<()>> {
  let reminders = state.reminders.clone();
  let reminder_job = spawn_loop("reminders", config.reminder_interval, move || {
    let reminders = reminders.clone();
    async move {
      match reminders.run_due_reminders(Utc::now()).await {
        Ok(outcomes) => info!(processed = outcomes.len(), "Reminder scan finished."),
        Err(err) => error!(error = %err, "Reminder scan failed."),
      }
    }
  });

  let day_ahead = state.day_ahead_reminders.clone();
  let day_ahead_job = spawn_loop("day_ahead_reminders", config.day_ahead_reminder_interval, move || {
    let day_ahead = day_ahead.clone();
    async move {
      match day_ahead.run_due_reminders(Utc::now()).await {
        Ok(outcomes) => info!(processed = outcomes.len(), "Day-ahead reminder scan finished."),
        Err(err) => error!(error = %err, "Day-ahead reminder scan failed."),
      }
    }
  });

  let follow_ups = state.reminders.clone();
  let follow_up_job = spawn_loop("follow_ups", config.follow_up_interval, move || {
    let follow_ups = follow_ups.clone();
    async move {
      match follow_ups.run_follow_ups(Utc::now()).await {
        Ok(outcomes) => info!(processed = outcomes.len(), "Follow-up scan finished."),
        Err(err) => error!(error = %err, "Follow-up scan failed."),
      }
    }
  });

  let workflow = state.workflow.clone();
  let sweep_job = spawn_loop("fulfillment_sweep", config.fulfillment_sweep_interval, move || {
    let workflow = workflow.clone();
    async move {
      match workflow.resume_fulfillment(SWEEP_BATCH).await {
        Ok(outcomes) if outcomes.is_empty() => {}
        Ok(outcomes) => info!(resumed = outcomes.len(), "Fulfillment sweep finished."),
        Err(err) => error!(error = %err, "Fulfillment sweep failed."),
      }
    }
  });

  vec![reminder_job, day_ahead_job, follow_up_job, sweep_job]
}
