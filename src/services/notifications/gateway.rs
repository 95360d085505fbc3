//! 短信网关抽象
//!
//! 真正的 HTTP 短信网关由外部系统提供，这里只定义接口与一个记录日志的实现。

use async_trait::async_trait;
use tracing::info;

use crate::errors::Result;

#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// 发送一条短信
    async fn send(&self, phone: &str, body: &str) -> Result<()>;
}

/// 仅写日志的短信网关
pub struct LogSmsGateway {
    sender_id: String,
}

impl LogSmsGateway {
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
        }
    }
}

#[async_trait]
impl SmsGateway for LogSmsGateway {
    async fn send(&self, phone: &str, body: &str) -> Result<()> {
        info!(
            sender = %self.sender_id,
            recipient = %phone,
            "SMS dispatched: {}",
            body
        );
        Ok(())
    }
}
