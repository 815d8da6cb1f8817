use crate::domain::model::CatalogItem;
use indexmap::map::Entry;
use indexmap::IndexMap;

/// 目錄快照：依伺服器回傳順序保存，以藥品 id 查詢
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    items: IndexMap<String, CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut map = IndexMap::with_capacity(items.len());
        for item in items {
            match map.entry(item.id.clone()) {
                Entry::Occupied(_) => {
                    tracing::warn!("🧾 Duplicate catalog id '{}', keeping first entry", item.id);
                }
                Entry::Vacant(slot) => {
                    slot.insert(item);
                }
            }
        }
        Self { items: map }
    }

    pub fn get(&self, item_id: &str) -> Option<&CatalogItem> {
        self.items.get(item_id)
    }

    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
