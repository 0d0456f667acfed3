//! 终端任务管理器：看板、任务表、用户和项目，需要本地登录

pub mod board;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod projects;
pub mod query;
pub mod session;
pub mod state;
pub mod users;
