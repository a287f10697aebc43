//! Notification Gateway
//!
//! 向已连接的客户端 (厨显、收银端、点餐前端) 广播订单变更。
//! 基于 tokio broadcast channel, 发布方从不等待接收方。

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use shared::message::SyncEvent;
use tokio::sync::broadcast;
use tracing::warn;

/// 广播通道容量, 写满后最旧的事件被丢弃
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号, 支持原子递增。
/// 客户端通过版本号判断数据新旧, 决定是否需要全量刷新。
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    ///
    /// 如果资源不存在，返回 0
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// 通知网关
///
/// 发布是同步且永不失败的, 调用方在事务提交之后调用。
#[derive(Clone, Debug)]
pub struct NotifyService {
    event_tx: broadcast::Sender<SyncEvent>,
    versions: Arc<ResourceVersions>,
}

impl NotifyService {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            event_tx,
            versions: Arc::new(ResourceVersions::new()),
        }
    }

    /// 订阅事件流 (网关出口和测试使用)
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }

    /// 发布资源变更
    ///
    /// 版本号按资源类型自动递增。没有任何订阅者时
    /// 只记录一条 warn 日志, 不影响调用方。
    pub fn publish<T: Serialize>(&self, event: &str, resource: &str, resource_id: &str, data: &T) {
        let version = self.versions.increment(resource);
        let payload = serde_json::to_value(data).ok();
        let sync = SyncEvent::new(event, resource, resource_id, version, payload);
        if self.event_tx.send(sync).is_err() {
            warn!("No subscribers for event {event} ({resource} {resource_id})");
        }
    }
}

impl Default for NotifyService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::ORDER_UPDATED;

    #[test]
    fn test_versions_increment_per_resource() {
        let versions = ResourceVersions::new();
        assert_eq!(versions.get("order"), 0);
        assert_eq!(versions.increment("order"), 1);
        assert_eq!(versions.increment("order"), 2);
        assert_eq!(versions.increment("ingredient"), 1);
        assert_eq!(versions.get("order"), 2);
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let notify = NotifyService::new();
        let mut rx = notify.subscribe();

        notify.publish(ORDER_UPDATED, "order", "42", &serde_json::json!({"id": 42}));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, ORDER_UPDATED);
        assert_eq!(event.resource_id, "42");
        assert_eq!(event.version, 1);
        assert!(event.data.is_some());
    }

    #[tokio::test]
    async fn test_versions_increase_across_events() {
        let notify = NotifyService::new();
        let mut rx = notify.subscribe();

        notify.publish(ORDER_UPDATED, "order", "1", &serde_json::json!({}));
        notify.publish(ORDER_UPDATED, "order", "1", &serde_json::json!({}));

        assert_eq!(rx.recv().await.unwrap().version, 1);
        assert_eq!(rx.recv().await.unwrap().version, 2);
    }

    #[test]
    fn test_publish_without_subscribers_does_not_panic() {
        let notify = NotifyService::new();
        notify.publish(ORDER_UPDATED, "order", "1", &serde_json::json!({}));
    }
}
