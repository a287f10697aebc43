//! 后台服务组件

pub mod notify;

pub use notify::{NotifyService, ResourceVersions};
