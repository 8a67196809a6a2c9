use chrono::Local;
use loandesk::config::SweepConfig;
use loandesk::error::AppError;
use loandesk::lending::{LoanRepository, LoanService, NoticePublisher};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

/// Wire the daily sweep (plus the optional midday re-check) onto a cron
/// scheduler and run one catch-up pass immediately, so a book that sat idle
/// while the process was down is brought current on startup.
pub(crate) async fn schedule_sweeps<R, N>(
    service: Arc<LoanService<R, N>>,
    config: &SweepConfig,
) -> Result<JobScheduler, AppError>
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    let scheduler = JobScheduler::new().await.map_err(schedule_error)?;

    scheduler
        .add(sweep_job(service.clone(), &config.schedule)?)
        .await
        .map_err(schedule_error)?;

    if let Some(midday) = &config.midday_schedule {
        scheduler
            .add(sweep_job(service.clone(), midday)?)
            .await
            .map_err(schedule_error)?;
    }

    scheduler.start().await.map_err(schedule_error)?;

    run_sweep_now(service.as_ref(), "startup");

    Ok(scheduler)
}

fn sweep_job<R, N>(service: Arc<LoanService<R, N>>, schedule: &str) -> Result<Job, AppError>
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    Job::new_async(schedule, move |_id, _scheduler| {
        let service = service.clone();
        Box::pin(async move {
            run_sweep_now(service.as_ref(), "scheduled");
        })
    })
    .map_err(schedule_error)
}

fn run_sweep_now<R, N>(service: &LoanService<R, N>, trigger: &str)
where
    R: LoanRepository + 'static,
    N: NoticePublisher + 'static,
{
    let today = Local::now().date_naive();
    match service.run_sweep(today) {
        Ok(outcome) => info!(
            trigger,
            %today,
            processed = outcome.processed,
            statuses_updated = outcome.statuses_updated,
            penalties_applied = outcome.penalties_applied,
            defaults = outcome.defaults,
            reminders = outcome.reminders,
            errors = outcome.errors,
            "sweep pass finished"
        ),
        Err(err) => warn!(trigger, %err, "sweep pass failed"),
    }
}

fn schedule_error(err: tokio_cron_scheduler::JobSchedulerError) -> AppError {
    AppError::Schedule(err.to_string())
}
