//! 每日缺勤短信推送任务

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone};
use tracing::{error, info};

use super::gateway::SmsGateway;
use super::notify_absentees;
use crate::config::NotificationConfig;
use crate::storage::Storage;

/// 距离下一次 `hour:00` 的等待时间
pub fn delay_until_hour<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> Duration {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let now_naive = now.naive_local();

    let mut next: NaiveDateTime = now_naive.date().and_time(at);
    if next <= now_naive {
        next += chrono::Duration::days(1);
    }

    (next - now_naive).to_std().unwrap_or(Duration::ZERO)
}

/// 启动每日推送任务
pub fn spawn_daily_sweep(
    storage: Arc<dyn Storage>,
    gateway: Arc<dyn SmsGateway>,
    config: NotificationConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Daily absence notification sweep scheduled at {:02}:00 local time",
            config.daily_hour
        );

        loop {
            let delay = delay_until_hour(&Local::now(), config.daily_hour);
            tokio::time::sleep(delay).await;

            let today = Local::now().date_naive();
            match notify_absentees(&storage, gateway.as_ref(), today, config.truncate_fields).await
            {
                Ok(report) => info!(
                    "Absence sweep for {}: {}/{} delivered, {} skipped, first error: {:?}",
                    today, report.success_count, report.attempted, report.skipped, report.first_error
                ),
                Err(e) => error!("Absence sweep for {} failed: {}", today, e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_delay_later_today() {
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 9, 30, 0).unwrap();
        assert_eq!(delay_until_hour(&now, 18), Duration::from_secs(8 * 3600 + 30 * 60));
    }

    #[test]
    fn test_delay_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 18, 0, 0).unwrap();
        assert_eq!(delay_until_hour(&now, 18), Duration::from_secs(24 * 3600));

        let now = Utc.with_ymd_and_hms(2025, 3, 4, 23, 15, 0).unwrap();
        assert_eq!(delay_until_hour(&now, 6), Duration::from_secs(6 * 3600 + 45 * 60));
    }
}
