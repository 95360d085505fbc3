use crate::config::AppConfig;
use crate::services::notifications::{LogSmsGateway, SmsGateway, sweep};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub gateway: Arc<dyn SmsGateway>,
}

/// 准备服务器启动的上下文
/// 包括存储、短信网关与每日缺勤推送任务
pub async fn prepare_server_startup() -> StartupContext {
    let config = AppConfig::get();

    let storage = match crate::storage::create_storage(&config.database).await {
        Ok(storage) => storage,
        Err(e) => {
            #[cfg(debug_assertions)]
            eprintln!("{}", e.format_colored());
            #[cfg(not(debug_assertions))]
            eprintln!("{}", e.format_simple());
            std::process::exit(1);
        }
    };
    warn!("Storage backend initialized and migrations completed");

    let gateway: Arc<dyn SmsGateway> =
        Arc::new(LogSmsGateway::new(config.notification.sender_id.clone()));

    if config.notification.enabled {
        sweep::spawn_daily_sweep(
            storage.clone(),
            gateway.clone(),
            config.notification.clone(),
        );
    } else {
        debug!("Daily absence notification sweep is disabled");
    }

    StartupContext { storage, gateway }
}
