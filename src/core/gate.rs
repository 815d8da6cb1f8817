use crate::core::cart::Cart;
use crate::core::catalog::Catalog;
use crate::domain::model::PrescriptionStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutVerdict {
    Allowed,
    /// 需要已核准處方的藥品名稱（目錄中找不到者以 id 表示）
    PrescriptionRequired { items: Vec<String> },
}

impl CheckoutVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, CheckoutVerdict::Allowed)
    }
}

/// 無處方藥、或附上的處方已核准時才可結帳
pub fn can_checkout(
    cart: &Cart,
    catalog: &Catalog,
    attached_status: Option<PrescriptionStatus>,
) -> bool {
    evaluate_checkout(cart, catalog, attached_status).is_allowed()
}

pub fn evaluate_checkout(
    cart: &Cart,
    catalog: &Catalog,
    attached_status: Option<PrescriptionStatus>,
) -> CheckoutVerdict {
    if attached_status == Some(PrescriptionStatus::Approved) {
        return CheckoutVerdict::Allowed;
    }

    // 目錄中找不到的品項無法確認是否為處方藥，一律視為需要處方
    let blocking: Vec<String> = cart
        .lines()
        .filter_map(|line| match catalog.get(&line.item_id) {
            Some(item) if item.prescription_required => Some(item.name.clone()),
            Some(_) => None,
            None => Some(line.item_id.clone()),
        })
        .collect();

    if blocking.is_empty() {
        CheckoutVerdict::Allowed
    } else {
        tracing::debug!(
            "💊 Checkout blocked by {} item(s), prescription status: {:?}",
            blocking.len(),
            attached_status
        );
        CheckoutVerdict::PrescriptionRequired { items: blocking }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CatalogItem;
    use rust_decimal::Decimal;

    fn fixture() -> (Catalog, CatalogItem, CatalogItem) {
        let otc = CatalogItem::new("m1", "Paracetamol", Decimal::from(20), false);
        let rx = CatalogItem::new("m2", "Amoxicillin", Decimal::from(120), true);
        (Catalog::new(vec![otc.clone(), rx.clone()]), otc, rx)
    }

    #[test]
    fn test_otc_only_cart_can_checkout_without_prescription() {
        let (catalog, otc, _) = fixture();
        let mut cart = Cart::new();
        cart.add_item(&otc);

        assert!(can_checkout(&cart, &catalog, None));
        assert!(can_checkout(&cart, &catalog, Some(PrescriptionStatus::Rejected)));
    }

    #[test]
    fn test_empty_cart_is_allowed() {
        let (catalog, _, _) = fixture();
        assert!(can_checkout(&Cart::new(), &catalog, None));
    }

    #[test]
    fn test_prescription_item_needs_approval() {
        let (catalog, otc, rx) = fixture();
        let mut cart = Cart::new();
        cart.add_item(&otc);
        cart.add_item(&rx);

        assert!(!can_checkout(&cart, &catalog, None));
        for status in [
            PrescriptionStatus::Pending,
            PrescriptionStatus::Rejected,
            PrescriptionStatus::Expired,
        ] {
            assert!(!can_checkout(&cart, &catalog, Some(status)));
        }
        assert!(can_checkout(&cart, &catalog, Some(PrescriptionStatus::Approved)));
    }

    #[test]
    fn test_verdict_names_blocking_items() {
        let (catalog, otc, rx) = fixture();
        let mut cart = Cart::new();
        cart.add_item(&rx);
        cart.add_item(&otc);
        cart.set_quantity("withdrawn", 1).unwrap();

        assert_eq!(
            evaluate_checkout(&cart, &catalog, Some(PrescriptionStatus::Pending)),
            CheckoutVerdict::PrescriptionRequired {
                items: vec!["Amoxicillin".to_string(), "withdrawn".to_string()]
            }
        );
    }
}
