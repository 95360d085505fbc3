//! Attendance Book - 考勤簿与点名记录服务
//!
//! 基于 Actix Web 构建的考勤后端：考勤簿管理、幂等点名、出勤统计与缺勤短信通知。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 角色校验中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层（含缺勤通知适配器）
//! - `storage`: 数据存储层（SeaORM），点名与统计的核心实现
//! - `utils`: 工具函数

pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
