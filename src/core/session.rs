use crate::core::cart::{Cart, CartEvent};
use crate::core::catalog::Catalog;
use crate::core::gate::{evaluate_checkout, CheckoutVerdict};
use crate::core::sequence::{FetchSequencer, FetchTicket};
use crate::domain::model::{CatalogItem, PrescriptionStatus};
use crate::domain::ports::{Notice, NotificationSink};
use crate::utils::error::{Result, StoreError};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub item_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// 結帳完成時的訂單摘要；交給外部的訂單/金流服務處理
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
    pub prescription_status: Option<PrescriptionStatus>,
}

/// 單一使用者工作階段：獨佔一個購物車與目前的目錄快照。
///
/// 所有購物車變更都經過這裡，並把結果轉送給通知端。
pub struct CartSession<N: NotificationSink> {
    cart: Cart,
    catalog: Catalog,
    sequencer: FetchSequencer,
    notifier: N,
}

impl<N: NotificationSink> CartSession<N> {
    pub fn new(notifier: N, discard_stale_responses: bool) -> Self {
        Self {
            cart: Cart::new(),
            catalog: Catalog::default(),
            sequencer: FetchSequencer::new(discard_stale_responses),
            notifier,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// 發出新的目錄請求序號
    pub fn begin_catalog_fetch(&mut self) -> FetchTicket {
        let ticket = self.sequencer.issue();
        tracing::debug!("📡 Catalog fetch #{} issued", ticket.value());
        ticket
    }

    /// 該序號是否仍是最新（或未啟用序號檢查）
    pub fn is_current_fetch(&self, ticket: FetchTicket) -> bool {
        self.sequencer.accepts(ticket)
    }

    /// 套用目錄回應；若已有更新的請求發出則丟棄並回傳 false
    pub fn apply_catalog(&mut self, ticket: FetchTicket, catalog: Catalog) -> bool {
        if !self.sequencer.accepts(ticket) {
            tracing::warn!(
                "⏭️ Discarding stale catalog response #{} (latest #{})",
                ticket.value(),
                self.sequencer.latest().map(|t| t.value()).unwrap_or(0)
            );
            return false;
        }

        tracing::info!("🧾 Catalog #{} applied with {} items", ticket.value(), catalog.len());
        self.catalog = catalog;

        let unpriced = self.cart.unpriced_lines(&self.catalog).len();
        if unpriced > 0 {
            tracing::warn!("🧾 {} cart line(s) no longer in the catalog", unpriced);
        }
        true
    }

    pub fn add_item(&mut self, item_id: &str) -> Result<u32> {
        let item = match self.catalog.get(item_id) {
            Some(item) => item.clone(),
            None => {
                return Err(self.reject(StoreError::UnknownItem {
                    item_id: item_id.to_string(),
                }))
            }
        };
        Ok(self.add_catalog_item(&item))
    }

    pub fn add_catalog_item(&mut self, item: &CatalogItem) -> u32 {
        let event = self.cart.add_item(item);
        self.publish(&event);
        self.cart.quantity(&item.id)
    }

    /// 設定數量；新增一行時藥品必須在目前目錄中，既有的行（即使已下架）仍可調整或移除
    pub fn set_quantity(&mut self, item_id: &str, new_quantity: i64) -> Result<u32> {
        if new_quantity > 0 && !self.cart.contains(item_id) && self.catalog.get(item_id).is_none()
        {
            return Err(self.reject(StoreError::UnknownItem {
                item_id: item_id.to_string(),
            }));
        }

        let event = self
            .cart
            .set_quantity(item_id, new_quantity)
            .map_err(|e| self.reject(e))?;
        self.publish(&event);
        Ok(self.cart.quantity(item_id))
    }

    pub fn increment(&mut self, item_id: &str) -> Result<u32> {
        let next = i64::from(self.cart.quantity(item_id)) + 1;
        self.set_quantity(item_id, next)
    }

    pub fn decrement(&mut self, item_id: &str) -> Result<u32> {
        let next = i64::from(self.cart.quantity(item_id)) - 1;
        self.set_quantity(item_id, next)
    }

    pub fn quantity(&self, item_id: &str) -> u32 {
        self.cart.quantity(item_id)
    }

    pub fn total(&self) -> Decimal {
        self.cart.total(&self.catalog)
    }

    pub fn can_checkout(&self, attached_status: Option<PrescriptionStatus>) -> bool {
        self.evaluate_checkout(attached_status).is_allowed()
    }

    pub fn evaluate_checkout(&self, attached_status: Option<PrescriptionStatus>) -> CheckoutVerdict {
        evaluate_checkout(&self.cart, &self.catalog, attached_status)
    }

    /// 通過處方檢查後產生訂單摘要並清空購物車
    pub fn complete_checkout(
        &mut self,
        attached_status: Option<PrescriptionStatus>,
    ) -> Result<OrderSummary> {
        if self.cart.is_empty() {
            return Err(self.reject(StoreError::validation("cart", "Your cart is empty")));
        }

        if let CheckoutVerdict::PrescriptionRequired { items } =
            self.evaluate_checkout(attached_status)
        {
            return Err(self.reject(StoreError::PrescriptionRequired { items }));
        }

        // 已下架的行無法定價，整筆訂單退回並保留購物車
        let unavailable: Vec<String> = self
            .cart
            .unpriced_lines(&self.catalog)
            .into_iter()
            .map(|line| line.item_id.clone())
            .collect();
        if !unavailable.is_empty() {
            return Err(self.reject(StoreError::UnavailableItems { items: unavailable }));
        }

        let lines: Vec<OrderLine> = self
            .cart
            .lines()
            .filter_map(|line| {
                self.catalog.get(&line.item_id).map(|item| OrderLine {
                    item_id: item.id.clone(),
                    name: item.name.clone(),
                    unit_price: item.price,
                    quantity: line.quantity,
                    line_total: item.price * Decimal::from(line.quantity),
                })
            })
            .collect();
        let summary = OrderSummary {
            total: lines.iter().map(|l| l.line_total).sum(),
            lines,
            prescription_status: attached_status,
        };

        tracing::info!(
            "🛒 Checkout completed: {} line(s), total {}",
            summary.lines.len(),
            summary.total
        );
        self.cart.clear();
        self.notifier.notify(Notice::success("Order placed successfully"));
        Ok(summary)
    }

    /// 工作階段結束時清空購物車
    pub fn reset(&mut self) {
        self.cart.clear();
        tracing::debug!("🛒 Cart reset");
    }

    fn reject(&self, err: StoreError) -> StoreError {
        self.notifier.notify(Notice::error(err.user_friendly_message()));
        err
    }

    fn publish(&self, event: &CartEvent) {
        let name = self
            .catalog
            .get(event.item_id())
            .map(|i| i.name.as_str())
            .unwrap_or_else(|| event.item_id());

        let notice = match event {
            CartEvent::ItemAdded { quantity, .. } => {
                Notice::success(format!("{} added to cart (qty {})", name, quantity))
            }
            CartEvent::QuantityUpdated { quantity, .. } => {
                Notice::info(format!("Quantity of {} updated to {}", name, quantity))
            }
            CartEvent::ItemRemoved { .. } => Notice::info(format!("{} removed from cart", name)),
        };
        tracing::debug!("🛒 {:?}", event);
        self.notifier.notify(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notify::MemoryNotifier;
    use crate::domain::ports::NoticeLevel;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            CatalogItem::new("m1", "Paracetamol", Decimal::from(50), false),
            CatalogItem::new("m2", "Amoxicillin", Decimal::from(120), true),
        ])
    }

    fn session() -> CartSession<MemoryNotifier> {
        CartSession::new(MemoryNotifier::new(), true).with_catalog(catalog())
    }

    #[test]
    fn test_add_unknown_item_is_rejected() {
        let mut session = session();
        let err = session.add_item("nope").unwrap_err();
        assert!(matches!(err, StoreError::UnknownItem { .. }));
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_every_transition_is_notified() {
        let mut session = session();
        session.add_item("m1").unwrap();
        session.increment("m1").unwrap();
        session.decrement("m1").unwrap();
        session.set_quantity("m1", 0).unwrap();

        let notices = session.notifier().notices();
        assert_eq!(notices.len(), 4);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(notices[0].message, "Paracetamol added to cart (qty 1)");
        assert_eq!(notices[1].message, "Quantity of Paracetamol updated to 2");
        assert_eq!(notices[3].message, "Paracetamol removed from cart");
    }

    #[test]
    fn test_stale_catalog_response_is_discarded() {
        let mut session = session();
        let first = session.begin_catalog_fetch();
        let second = session.begin_catalog_fetch();

        let newer = Catalog::new(vec![CatalogItem::new(
            "m1",
            "Paracetamol",
            Decimal::from(55),
            false,
        )]);
        let older = Catalog::new(vec![CatalogItem::new(
            "m1",
            "Paracetamol",
            Decimal::from(40),
            false,
        )]);

        assert!(session.apply_catalog(second, newer));
        assert!(!session.apply_catalog(first, older));
        assert_eq!(session.catalog().get("m1").unwrap().price, Decimal::from(55));
    }

    #[test]
    fn test_late_response_overwrites_when_sequencing_disabled() {
        let mut session = CartSession::new(MemoryNotifier::new(), false);
        let first = session.begin_catalog_fetch();
        let second = session.begin_catalog_fetch();

        assert!(session.apply_catalog(second, catalog()));
        assert!(session.apply_catalog(first, Catalog::default()));
        assert!(session.catalog().is_empty());
    }

    #[test]
    fn test_total_tracks_refreshed_prices() {
        let mut session = session();
        session.add_item("m1").unwrap();
        session.set_quantity("m1", 3).unwrap();
        assert_eq!(session.total(), Decimal::from(150));

        let ticket = session.begin_catalog_fetch();
        session.apply_catalog(
            ticket,
            Catalog::new(vec![CatalogItem::new(
                "m1",
                "Paracetamol",
                Decimal::new(4550, 2),
                false,
            )]),
        );
        assert_eq!(session.total(), Decimal::new(13650, 2));
    }

    #[test]
    fn test_checkout_blocked_until_prescription_approved() {
        let mut session = session();
        session.add_item("m2").unwrap();

        assert!(!session.can_checkout(None));
        let err = session.complete_checkout(None).unwrap_err();
        assert!(matches!(err, StoreError::PrescriptionRequired { .. }));
        assert_eq!(session.quantity("m2"), 1);

        let summary = session
            .complete_checkout(Some(PrescriptionStatus::Approved))
            .unwrap();
        assert_eq!(summary.total, Decimal::from(120));
        assert_eq!(summary.lines[0].name, "Amoxicillin");
        assert!(session.cart().is_empty());

        let last = session.notifier().notices().pop().unwrap();
        assert_eq!(last.level, NoticeLevel::Success);
    }

    #[test]
    fn test_set_quantity_rejects_item_outside_catalog() {
        let mut session = session();
        let err = session.set_quantity("ghost", 2).unwrap_err();
        assert!(matches!(err, StoreError::UnknownItem { .. }));
        assert!(session.cart().is_empty());
        assert_eq!(session.notifier().notices()[0].level, NoticeLevel::Error);

        // 移除不存在的行仍為 no-op
        assert_eq!(session.set_quantity("ghost", 0).unwrap(), 0);
    }

    #[test]
    fn test_checkout_rejects_withdrawn_lines_even_when_approved() {
        let mut session = session();
        session.add_item("m1").unwrap();
        session.add_item("m2").unwrap();
        session.set_quantity("m2", 2).unwrap();

        let ticket = session.begin_catalog_fetch();
        session.apply_catalog(
            ticket,
            Catalog::new(vec![CatalogItem::new(
                "m1",
                "Paracetamol",
                Decimal::from(50),
                false,
            )]),
        );
        // 下架的行仍可調整數量
        assert_eq!(session.set_quantity("m2", 3).unwrap(), 3);

        let err = session
            .complete_checkout(Some(PrescriptionStatus::Approved))
            .unwrap_err();
        match err {
            StoreError::UnavailableItems { items } => assert_eq!(items, vec!["m2"]),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(session.quantity("m1"), 1);
        assert_eq!(session.quantity("m2"), 3);
        assert_eq!(
            session.notifier().notices().last().unwrap().level,
            NoticeLevel::Error
        );

        session.set_quantity("m2", 0).unwrap();
        let summary = session
            .complete_checkout(Some(PrescriptionStatus::Approved))
            .unwrap();
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.total, Decimal::from(50));
    }

    #[test]
    fn test_checkout_of_empty_cart_fails() {
        let mut session = session();
        let err = session.complete_checkout(None).unwrap_err();
        assert_eq!(err.to_string(), "Your cart is empty");
    }
}
