use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use super::notification_repository::NotificationRepository;

const RETENTION_DAYS: i32 = 30;

/// Starts the background sweep that prunes read notifications past the
/// retention window. Runs nightly at 03:00.
pub async fn start_notification_service(
    repo: NotificationRepository,
) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async("0 0 3 * * *", move |_uuid, _l| {
        let repo = repo.clone();

        Box::pin(async move {
            match repo.delete_old_read(RETENTION_DAYS).await {
                Ok(0) => {}
                Ok(removed) => info!("Pruned {} read notifications", removed),
                Err(e) => error!("Notification cleanup failed: {:?}", e),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!("Notification cleanup job scheduled");
    Ok(())
}
