//! 同步事件类型定义
//!
//! 服务端与客户端（厨显、收银端、点餐前端）之间共享的
//! 变更通知结构。传输机制由网关决定，这里只定义载荷。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 订单创建事件名
pub const ORDER_CREATED: &str = "order:new";
/// 订单变更事件名（状态流转、结账）
pub const ORDER_UPDATED: &str = "order:updated";

/// 资源变更通知
///
/// `version` 由服务端按资源类型单调递增，
/// 客户端用它判断数据新旧并决定是否需要全量刷新。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEvent {
    /// 事件追踪 ID
    pub id: Uuid,
    /// 事件名 (如 "order:new", "ingredient:updated")
    pub event: String,
    /// 资源类型 (如 "order", "menu_item")
    pub resource: String,
    /// 资源 ID
    pub resource_id: String,
    /// 资源版本号 (按资源类型递增)
    pub version: u64,
    /// 资源数据 (删除/关闭时可为空)
    pub data: Option<serde_json::Value>,
}

impl SyncEvent {
    /// 创建新事件
    pub fn new(
        event: impl Into<String>,
        resource: impl Into<String>,
        resource_id: impl Into<String>,
        version: u64,
        data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event: event.into(),
            resource: resource.into(),
            resource_id: resource_id.into(),
            version,
            data,
        }
    }

    /// 序列化为二进制 (用于网络传输)
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// 从二进制解析
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
