use crate::domain::model::CatalogItem;
use crate::domain::ports::CatalogSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// 離線/示範模式的目錄，只在配置明確選擇 `mode = "demo"` 時使用
#[derive(Debug, Clone)]
pub struct DemoCatalog {
    items: Vec<CatalogItem>,
}

impl DemoCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }
}

impl Default for DemoCatalog {
    fn default() -> Self {
        Self::new(builtin_items())
    }
}

pub fn builtin_items() -> Vec<CatalogItem> {
    let mut para = CatalogItem::new("demo-paracetamol", "Paracetamol 500mg", Decimal::new(2500, 2), false);
    para.notes = Some("Strip of 10 tablets".to_string());

    let mut cetirizine = CatalogItem::new("demo-cetirizine", "Cetirizine 10mg", Decimal::new(1850, 2), false);
    cetirizine.notes = Some("Antihistamine".to_string());

    let mut amoxicillin = CatalogItem::new("demo-amoxicillin", "Amoxicillin 250mg", Decimal::new(11200, 2), true);
    amoxicillin.notes = Some("Antibiotic, prescription only".to_string());

    let mut metformin = CatalogItem::new("demo-metformin", "Metformin 500mg", Decimal::new(6475, 2), true);
    metformin.notes = Some("Prescription only".to_string());

    vec![para, cetirizine, amoxicillin, metformin]
}

#[async_trait]
impl CatalogSource for DemoCatalog {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>> {
        tracing::info!("🧪 Serving {} demo catalog items", self.items.len());
        Ok(self.items.clone())
    }

    fn source_name(&self) -> &str {
        "demo"
    }
}
