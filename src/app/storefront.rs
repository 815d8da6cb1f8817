use crate::adapters::{DemoCatalog, StorefrontClient};
use crate::config::{CatalogMode, StorefrontConfig};
use crate::core::catalog::Catalog;
use crate::core::sequence::FetchTicket;
use crate::core::session::{CartSession, OrderSummary};
use crate::domain::model::{
    latest_prescription_status, PrescriptionRecord, PrescriptionStatus, RefillSuggestion,
};
use crate::domain::ports::{
    CatalogSource, Notice, NotificationSink, PrescriptionSource, RefillSource,
};
use crate::utils::error::Result;

/// 店面應用服務：組合目錄來源、遠端服務與使用者的工作階段
pub struct Storefront<N: NotificationSink> {
    source: Box<dyn CatalogSource>,
    prescriptions: Option<Box<dyn PrescriptionSource>>,
    refills: Option<Box<dyn RefillSource>>,
    session: CartSession<N>,
}

impl<N: NotificationSink> Storefront<N> {
    pub fn new(source: Box<dyn CatalogSource>, session: CartSession<N>) -> Self {
        Self {
            source,
            prescriptions: None,
            refills: None,
            session,
        }
    }

    pub fn with_prescriptions(mut self, prescriptions: Box<dyn PrescriptionSource>) -> Self {
        self.prescriptions = Some(prescriptions);
        self
    }

    pub fn with_refills(mut self, refills: Box<dyn RefillSource>) -> Self {
        self.refills = Some(refills);
        self
    }

    /// 依配置建立；目錄來源由 `catalog.mode` 明確決定，遠端失敗不會改用示範資料
    pub fn from_config(config: &StorefrontConfig, notifier: N) -> Result<Self> {
        let client = StorefrontClient::new(&config.api)?;
        let session = CartSession::new(notifier, config.catalog.discard_stale_responses);

        let source: Box<dyn CatalogSource> = match config.catalog.mode {
            CatalogMode::Remote => Box::new(client.clone()),
            CatalogMode::Demo => Box::new(DemoCatalog::new(config.demo_catalog_items())),
        };
        tracing::info!("🏪 Storefront using {} catalog", source.source_name());

        Ok(Self::new(source, session)
            .with_prescriptions(Box::new(client.clone()))
            .with_refills(Box::new(client)))
    }

    pub fn session(&self) -> &CartSession<N> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CartSession<N> {
        &mut self.session
    }

    /// 發出目錄請求序號。多個請求可重疊：各自 `fetch_catalog` 後以 `apply_refresh` 套用，
    /// 只有最新序號的回應會生效
    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.session.begin_catalog_fetch()
    }

    pub async fn fetch_catalog(&self) -> Result<Catalog> {
        Ok(Catalog::new(self.source.fetch_catalog().await?))
    }

    /// 套用一次目錄請求的結果；回傳 false 表示回應已過期而被丟棄
    pub fn apply_refresh(&mut self, ticket: FetchTicket, result: Result<Catalog>) -> Result<bool> {
        match result {
            Ok(catalog) => Ok(self.session.apply_catalog(ticket, catalog)),
            Err(e) if !self.session.is_current_fetch(ticket) => {
                tracing::debug!(
                    "⏭️ Ignoring failure of stale catalog fetch #{}: {}",
                    ticket.value(),
                    e
                );
                Ok(false)
            }
            Err(e) => {
                tracing::error!("🧾 Catalog fetch #{} failed: {}", ticket.value(), e);
                self.session.notifier().notify(Notice::error(format!(
                    "Failed to load medicines: {}",
                    e.user_friendly_message()
                )));
                Err(e)
            }
        }
    }

    /// 重新載入目錄；回傳 false 表示回應已過期而被丟棄
    pub async fn refresh_catalog(&mut self) -> Result<bool> {
        let ticket = self.begin_refresh();
        let result = self.fetch_catalog().await;
        self.apply_refresh(ticket, result)
    }

    /// 續藥建議屬於非必要資訊：任何錯誤都直接忽略並回傳空清單
    pub async fn refill_suggestions(&self) -> Vec<RefillSuggestion> {
        let Some(refills) = &self.refills else {
            return Vec::new();
        };

        match refills.refill_suggestions().await {
            Ok(suggestions) => suggestions,
            Err(e) if e.is_silently_degradable() => {
                tracing::debug!("💤 Refill suggestions unavailable: {}", e);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("💤 Refill suggestions skipped: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn prescriptions(&self) -> Result<Vec<PrescriptionRecord>> {
        match &self.prescriptions {
            Some(source) => source.my_prescriptions().await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn attached_prescription_status(&self) -> Result<Option<PrescriptionStatus>> {
        let records = self.prescriptions().await?;
        Ok(latest_prescription_status(&records))
    }

    /// 結帳：只有購物車含處方藥時才查詢處方狀態
    pub async fn checkout(&mut self) -> Result<OrderSummary> {
        let status = if self.session.can_checkout(None) {
            None
        } else {
            match self.attached_prescription_status().await {
                Ok(status) => status,
                Err(e) => {
                    self.session
                        .notifier()
                        .notify(Notice::error(e.user_friendly_message()));
                    return Err(e);
                }
            }
        };

        self.session.complete_checkout(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryNotifier;
    use crate::domain::model::CatalogItem;
    use crate::domain::ports::NoticeLevel;
    use crate::utils::error::StoreError;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct FailingSource;

    #[async_trait]
    impl CatalogSource for FailingSource {
        async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>> {
            Err(StoreError::ServiceError {
                status: 503,
                message: "Service Unavailable".to_string(),
            })
        }

        fn source_name(&self) -> &str {
            "failing"
        }
    }

    #[async_trait]
    impl RefillSource for FailingSource {
        async fn refill_suggestions(&self) -> Result<Vec<RefillSuggestion>> {
            Err(StoreError::malformed("refill suggestion", "expected a JSON array"))
        }
    }

    #[async_trait]
    impl PrescriptionSource for FailingSource {
        async fn my_prescriptions(&self) -> Result<Vec<PrescriptionRecord>> {
            Err(StoreError::ServiceError {
                status: 401,
                message: "Not authorized".to_string(),
            })
        }
    }

    /// 每次請求價格加一，用來分辨回應的先後
    #[derive(Default)]
    struct RepricingSource {
        calls: AtomicI64,
    }

    #[async_trait]
    impl CatalogSource for RepricingSource {
        async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>> {
            let price = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(vec![CatalogItem::new("m1", "ORS", Decimal::from(price), false)])
        }

        fn source_name(&self) -> &str {
            "repricing"
        }
    }

    fn demo_storefront() -> Storefront<MemoryNotifier> {
        let session = CartSession::new(MemoryNotifier::new(), true);
        Storefront::new(Box::new(DemoCatalog::default()), session)
    }

    #[tokio::test]
    async fn test_refresh_from_demo_catalog() {
        let mut store = demo_storefront();
        assert!(store.refresh_catalog().await.unwrap());
        assert_eq!(store.session().catalog().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_catalog_and_notifies() {
        let catalog = Catalog::new(vec![CatalogItem::new("m1", "ORS", Decimal::from(15), false)]);
        let session = CartSession::new(MemoryNotifier::new(), true).with_catalog(catalog);
        let mut store = Storefront::new(Box::new(FailingSource), session);

        assert!(store.refresh_catalog().await.is_err());
        assert_eq!(store.session().catalog().len(), 1);

        let notices = store.session().notifier().notices();
        assert_eq!(notices[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_keep_latest_response() {
        let session = CartSession::new(MemoryNotifier::new(), true);
        let mut store = Storefront::new(Box::new(RepricingSource::default()), session);

        let first = store.begin_refresh();
        let second = store.begin_refresh();
        let first_result = store.fetch_catalog().await;
        let second_result = store.fetch_catalog().await;

        assert!(store.apply_refresh(second, second_result).unwrap());
        assert!(!store.apply_refresh(first, first_result).unwrap());
        assert_eq!(store.session().catalog().get("m1").unwrap().price, Decimal::from(2));

        let stale = store.begin_refresh();
        let _latest = store.begin_refresh();
        let failure = Err(StoreError::ServiceError {
            status: 502,
            message: "Bad Gateway".to_string(),
        });
        assert!(!store.apply_refresh(stale, failure).unwrap());
        assert!(store.session().notifier().notices().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_apply_in_arrival_order_when_disabled() {
        let session = CartSession::new(MemoryNotifier::new(), false);
        let mut store = Storefront::new(Box::new(RepricingSource::default()), session);

        let first = store.begin_refresh();
        let second = store.begin_refresh();
        let first_result = store.fetch_catalog().await;
        let second_result = store.fetch_catalog().await;

        assert!(store.apply_refresh(second, second_result).unwrap());
        assert!(store.apply_refresh(first, first_result).unwrap());
        assert_eq!(store.session().catalog().get("m1").unwrap().price, Decimal::from(1));
    }

    #[tokio::test]
    async fn test_refill_failures_degrade_silently() {
        let store = demo_storefront().with_refills(Box::new(FailingSource));
        assert!(store.refill_suggestions().await.is_empty());
        assert!(store.session().notifier().notices().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_of_otc_cart_skips_prescription_lookup() {
        let mut store = demo_storefront().with_prescriptions(Box::new(FailingSource));
        store.refresh_catalog().await.unwrap();
        store.session_mut().add_item("demo-paracetamol").unwrap();

        let summary = store.checkout().await.unwrap();
        assert_eq!(summary.total, Decimal::new(2500, 2));
        assert!(summary.prescription_status.is_none());
    }

    #[tokio::test]
    async fn test_checkout_surfaces_prescription_lookup_failure() {
        let mut store = demo_storefront().with_prescriptions(Box::new(FailingSource));
        store.refresh_catalog().await.unwrap();
        store.session_mut().add_item("demo-amoxicillin").unwrap();

        let err = store.checkout().await.unwrap_err();
        assert!(matches!(err, StoreError::ServiceError { status: 401, .. }));
        assert_eq!(store.session().quantity("demo-amoxicillin"), 1);
    }

    #[tokio::test]
    async fn test_checkout_without_prescription_source_blocks_rx() {
        let mut store = demo_storefront();
        store.refresh_catalog().await.unwrap();
        store.session_mut().add_item("demo-metformin").unwrap();

        let err = store.checkout().await.unwrap_err();
        assert!(matches!(err, StoreError::PrescriptionRequired { .. }));
    }
}
