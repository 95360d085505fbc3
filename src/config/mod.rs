//! 配置管理
//!
//! 加载顺序：`config.toml` → `config.{APP_ENV}.toml` → `ATTENDANCE_*` 环境变量 → 显式覆盖。

mod r#impl;
mod structs;

pub use structs::*;
