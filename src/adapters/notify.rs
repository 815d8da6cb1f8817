use crate::domain::ports::{Notice, NoticeLevel, NotificationSink};
use std::sync::{Arc, Mutex};

/// 將通知寫入日誌
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => tracing::info!("✅ {}", notice.message),
            NoticeLevel::Info => tracing::info!("ℹ️ {}", notice.message),
            NoticeLevel::Error => tracing::error!("❌ {}", notice.message),
        }
    }
}

/// 在記憶體中收集通知，CLI 輸出與測試都會用到
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut notices| std::mem::take(&mut *notices))
            .unwrap_or_default()
    }
}

impl NotificationSink for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!("🔔 {}", notice);
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Catalog;
    use crate::core::session::CartSession;
    use crate::domain::model::CatalogItem;
    use rust_decimal::Decimal;

    #[test]
    fn test_tracing_notifier_drives_session() {
        let catalog = Catalog::new(vec![CatalogItem::new("m1", "ORS", Decimal::from(15), false)]);
        let mut session = CartSession::new(TracingNotifier, true).with_catalog(catalog);

        session.add_item("m1").unwrap();
        assert!(session.add_item("missing").is_err());
        session.notifier().notify(Notice::info("cart ready"));
        assert_eq!(session.total(), Decimal::from(15));
    }

    #[test]
    fn test_memory_notifier_shares_state_between_clones() {
        let notifier = MemoryNotifier::new();
        let handle = notifier.clone();

        notifier.notify(Notice::success("saved"));
        handle.notify(Notice::error("failed"));

        assert_eq!(notifier.notices().len(), 2);
        let drained = handle.drain();
        assert_eq!(drained[1].level, NoticeLevel::Error);
        assert!(notifier.notices().is_empty());
    }
}
