//! JSON request and response bodies of the HTTP API.
//!
//! Field names follow the public wire format (`nome`, `valor_total`, ...);
//! conversions from engine types live next to each response type.

use chrono::{DateTime, SecondsFormat, Utc};
use engine::{
    ComparisonReport, ComparisonRow, LineItem, MoneyCents, Product, Purchase, PurchaseDetail,
    ShoppingList, ShoppingListItem, User,
};
use serde::{Deserialize, Serialize};

use crate::ServerError;

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct Register {
        pub nome: String,
        pub email: String,
        pub senha: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Login {
        pub email: String,
        pub senha: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct GoogleLogin {
        pub id_token: String,
    }

    #[derive(Debug, Serialize)]
    pub struct UserSummary {
        pub id: i32,
        pub nome: String,
        pub email: String,
        pub data_cadastro: String,
    }

    impl From<User> for UserSummary {
        fn from(user: User) -> Self {
            Self {
                id: user.id,
                nome: user.name,
                email: user.email,
                data_cadastro: timestamp(user.created_at),
            }
        }
    }

    #[derive(Debug, Serialize)]
    pub struct TokenResponse {
        pub access_token: String,
        pub usuario: UserSummary,
    }
}

pub mod products {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct ProductNew {
        pub codigo_barras: String,
        pub nome: String,
        #[serde(default)]
        pub marca: Option<String>,
    }

    #[derive(Debug, Serialize)]
    pub struct ProductView {
        pub id: i32,
        pub codigo_barras: String,
        pub nome: String,
        pub marca: Option<String>,
    }

    impl From<Product> for ProductView {
        fn from(product: Product) -> Self {
            Self {
                id: product.id,
                codigo_barras: product.barcode,
                nome: product.name,
                marca: product.brand,
            }
        }
    }
}

pub mod purchases {
    use super::{products::ProductView, *};

    /// A price given either as a JSON number or as a decimal string.
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum PriceInput {
        Number(serde_json::Number),
        Text(String),
    }

    impl PriceInput {
        pub fn to_money(&self) -> Result<MoneyCents, ServerError> {
            let raw = match self {
                PriceInput::Number(number) => number.to_string(),
                PriceInput::Text(text) => text.clone(),
            };
            raw.parse::<MoneyCents>().map_err(ServerError::from)
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct PurchaseItemNew {
        pub produto_id: i32,
        pub preco_pago: PriceInput,
        #[serde(default)]
        pub quantidade: Option<i64>,
    }

    #[derive(Debug, Serialize)]
    pub struct PurchaseStarted {
        pub compra_id: i32,
        pub valor_total: f64,
    }

    #[derive(Debug, Serialize)]
    pub struct ItemAdded {
        pub item_id: i32,
        pub valor_total: f64,
    }

    #[derive(Debug, Serialize)]
    pub struct Total {
        pub valor_total: f64,
    }

    #[derive(Debug, Serialize)]
    pub struct PurchaseFinished {
        pub message: &'static str,
        pub valor_total: f64,
        pub compra_id: i32,
    }

    #[derive(Debug, Serialize)]
    pub struct LineItemView {
        pub id: i32,
        pub quantidade: i32,
        pub preco_pago: f64,
        pub produto: ProductView,
    }

    impl From<LineItem> for LineItemView {
        fn from(item: LineItem) -> Self {
            Self {
                id: item.id,
                quantidade: item.quantity,
                preco_pago: item.unit_price.to_major_f64(),
                produto: item.product.into(),
            }
        }
    }

    #[derive(Debug, Serialize)]
    pub struct PurchaseView {
        pub id: i32,
        pub data_compra: String,
        pub valor_total: f64,
        pub finalizada: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub itens: Option<Vec<LineItemView>>,
    }

    impl From<Purchase> for PurchaseView {
        fn from(purchase: Purchase) -> Self {
            Self {
                id: purchase.id,
                data_compra: timestamp(purchase.created_at),
                valor_total: purchase.total.to_major_f64(),
                finalizada: purchase.finalized,
                itens: None,
            }
        }
    }

    impl From<PurchaseDetail> for PurchaseView {
        fn from(detail: PurchaseDetail) -> Self {
            let mut view = PurchaseView::from(detail.purchase);
            view.itens = Some(detail.items.into_iter().map(Into::into).collect());
            view
        }
    }
}

pub mod lists {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct ListNew {
        pub nome: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ListItemNew {
        #[serde(alias = "descricao")]
        pub descricao_item: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ListItemUpdate {
        pub concluido: bool,
    }

    #[derive(Debug, Serialize)]
    pub struct ListItemView {
        pub id: i32,
        pub descricao_item: String,
        pub concluido: bool,
    }

    impl From<ShoppingListItem> for ListItemView {
        fn from(item: ShoppingListItem) -> Self {
            Self {
                id: item.id,
                descricao_item: item.description,
                concluido: item.completed,
            }
        }
    }

    #[derive(Debug, Serialize)]
    pub struct ListView {
        pub id: i32,
        pub nome: String,
        pub data_criacao: String,
        pub itens: Vec<ListItemView>,
    }

    impl From<ShoppingList> for ListView {
        fn from(list: ShoppingList) -> Self {
            Self {
                id: list.id,
                nome: list.name,
                data_criacao: timestamp(list.created_at),
                itens: list.items.into_iter().map(Into::into).collect(),
            }
        }
    }
}

pub mod history {
    use super::{products::ProductView, *};

    /// Raw query parameters; validated by the handler.
    #[derive(Debug, Deserialize)]
    pub struct CompareQuery {
        pub a: Option<String>,
        pub b: Option<String>,
    }

    #[derive(Debug, Serialize)]
    pub struct ComparisonRowView {
        pub produto: ProductView,
        pub preco_a: f64,
        pub preco_b: f64,
        pub delta: f64,
        pub percent: Option<f64>,
        pub quantidade_a: i64,
        pub quantidade_b: i64,
    }

    impl From<ComparisonRow> for ComparisonRowView {
        fn from(row: ComparisonRow) -> Self {
            Self {
                produto: row.product.into(),
                preco_a: row.avg_price_a.to_major_f64(),
                preco_b: row.avg_price_b.to_major_f64(),
                delta: row.delta.to_major_f64(),
                percent: row.percent.map(|p| p.to_f64()),
                quantidade_a: row.quantity_a,
                quantidade_b: row.quantity_b,
            }
        }
    }

    #[derive(Debug, Serialize)]
    pub struct ComparisonView {
        pub compra_a: i32,
        pub compra_b: i32,
        pub common_count: usize,
        pub only_in_a: Vec<i32>,
        pub only_in_b: Vec<i32>,
        pub items: Vec<ComparisonRowView>,
    }

    impl From<ComparisonReport> for ComparisonView {
        fn from(report: ComparisonReport) -> Self {
            Self {
                compra_a: report.purchase_a,
                compra_b: report.purchase_b,
                common_count: report.common_count,
                only_in_a: report.only_in_a,
                only_in_b: report.only_in_b,
                items: report.items.into_iter().map(Into::into).collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::purchases::PurchaseItemNew;

    #[test]
    fn price_accepts_numbers_and_strings() {
        let body: PurchaseItemNew =
            serde_json::from_str(r#"{"produto_id": 1, "preco_pago": 4.99}"#).unwrap();
        assert_eq!(body.preco_pago.to_money().ok().map(|m| m.cents()), Some(499));
        assert_eq!(body.quantidade, None);

        let body: PurchaseItemNew =
            serde_json::from_str(r#"{"produto_id": 1, "preco_pago": "10,5", "quantidade": 3}"#)
                .unwrap();
        assert_eq!(body.preco_pago.to_money().ok().map(|m| m.cents()), Some(1050));
        assert_eq!(body.quantidade, Some(3));
    }

    #[test]
    fn price_with_three_decimals_is_rejected() {
        let body: PurchaseItemNew =
            serde_json::from_str(r#"{"produto_id": 1, "preco_pago": "1.234"}"#).unwrap();
        assert!(body.preco_pago.to_money().is_err());
    }

    #[test]
    fn list_item_accepts_description_alias() {
        let body: super::lists::ListItemNew =
            serde_json::from_str(r#"{"descricao": "Eggs"}"#).unwrap();
        assert_eq!(body.descricao_item, "Eggs");
    }
}
