use crate::core::catalog::Catalog;
use crate::domain::model::{CartLine, CatalogItem};
use crate::utils::error::{Result, StoreError};
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// 購物車操作的結果，由持有者轉送給通知端
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    ItemAdded { item_id: String, quantity: u32 },
    QuantityUpdated { item_id: String, quantity: u32 },
    ItemRemoved { item_id: String, was_present: bool },
}

impl CartEvent {
    pub fn item_id(&self) -> &str {
        match self {
            CartEvent::ItemAdded { item_id, .. }
            | CartEvent::QuantityUpdated { item_id, .. }
            | CartEvent::ItemRemoved { item_id, .. } => item_id,
        }
    }
}

/// 以藥品 id 為鍵、依加入順序排列的購物車。
///
/// 不變式：不存在數量為 0 的行；總額每次查詢時依目前目錄價格重新計算。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: IndexMap<String, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一件，永不失敗；數量已達 u32 上限時維持上限不變
    /// （`set_quantity` 則對超出上限的輸入回傳驗證錯誤）
    pub fn add_item(&mut self, item: &CatalogItem) -> CartEvent {
        let line = self
            .lines
            .entry(item.id.clone())
            .and_modify(|line| line.quantity = line.quantity.saturating_add(1))
            .or_insert_with(|| CartLine {
                item_id: item.id.clone(),
                quantity: 1,
            });

        CartEvent::ItemAdded {
            item_id: item.id.clone(),
            quantity: line.quantity,
        }
    }

    /// 設定數量；小於等於 0 時移除該行（不存在時為 no-op）。
    /// 遞增/遞減由呼叫端以 `quantity(id) ± 1` 計算後傳入。
    pub fn set_quantity(&mut self, item_id: &str, new_quantity: i64) -> Result<CartEvent> {
        if new_quantity <= 0 {
            // shift_remove 保持其餘行的插入順序
            let was_present = self.lines.shift_remove(item_id).is_some();
            return Ok(CartEvent::ItemRemoved {
                item_id: item_id.to_string(),
                was_present,
            });
        }

        let quantity = u32::try_from(new_quantity).map_err(|_| {
            StoreError::validation(
                "quantity",
                format!("Quantity {} is too large", new_quantity),
            )
        })?;

        self.lines
            .entry(item_id.to_string())
            .and_modify(|line| line.quantity = quantity)
            .or_insert_with(|| CartLine {
                item_id: item_id.to_string(),
                quantity,
            });

        Ok(CartEvent::QuantityUpdated {
            item_id: item_id.to_string(),
            quantity,
        })
    }

    pub fn quantity(&self, item_id: &str) -> u32 {
        self.lines.get(item_id).map(|l| l.quantity).unwrap_or(0)
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.lines.contains_key(item_id)
    }

    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Σ 價格 × 數量，使用目錄目前的價格；目錄中找不到的行不計入
    pub fn total(&self, catalog: &Catalog) -> Decimal {
        self.lines
            .values()
            .filter_map(|line| {
                catalog
                    .get(&line.item_id)
                    .map(|item| item.price * Decimal::from(line.quantity))
            })
            .sum()
    }

    /// 目錄中已無價格的行（例如藥品下架）
    pub fn unpriced_lines<'a>(&'a self, catalog: &'a Catalog) -> Vec<&'a CartLine> {
        self.lines
            .values()
            .filter(|line| catalog.get(&line.item_id).is_none())
            .collect()
    }
}
