//! The fixed document category catalogue.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::Result;
use crate::models::Category;

/// One of the seven category keys a document can be filed under.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
    strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryKey {
    FinanceAccounting,
    HumanResources,
    LegalCompliance,
    SalesMarketing,
    OperationsTechnical,
    ManagementInternal,
    Others,
}

impl CategoryKey {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::FinanceAccounting => {
                "Invoices, receipts, financial statements, payroll, budgets, tax documents"
            }
            Self::HumanResources => {
                "Labor contracts, onboarding, resignation letters, leave applications, recruitment files"
            }
            Self::LegalCompliance => {
                "Contracts, agreements, policies, regulations, meeting minutes, government notices"
            }
            Self::SalesMarketing => {
                "Quotations, proposals, brochures, customer profiles, sales reports"
            }
            Self::OperationsTechnical => {
                "SOPs, manuals, technical documentation, IT system documents, checklists"
            }
            Self::ManagementInternal => {
                "Internal reports, project documents, internal announcements, meeting summaries"
            }
            Self::Others => "Miscellaneous documents that do not fit above categories",
        }
    }
}

/// Map a free-form label from the model onto a category key.
///
/// An exact key wins. Otherwise the first key (in catalogue order) whose
/// lower-cased form occurs inside the lower-cased label is used, and
/// anything else becomes `OTHERS`.
///
/// # Examples
/// ```
/// use doclens_pipeline::categories::{normalize_category, CategoryKey};
///
/// assert_eq!(normalize_category("HUMAN_RESOURCES"), CategoryKey::HumanResources);
/// assert_eq!(normalize_category("probably finance_accounting"), CategoryKey::FinanceAccounting);
/// assert_eq!(normalize_category("Invoice"), CategoryKey::Others);
/// ```
pub fn normalize_category(raw: &str) -> CategoryKey {
    if let Ok(key) = raw.parse::<CategoryKey>() {
        return key;
    }

    let lowered = raw.to_lowercase();
    CategoryKey::iter()
        .find(|key| lowered.contains(&key.as_str().to_lowercase()))
        .unwrap_or(CategoryKey::Others)
}

/// `KEY: description` lines for every category, in catalogue order.
pub fn categories_block() -> String {
    CategoryKey::iter()
        .map(|key| format!("{}: {}", key.as_str(), key.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Insert every category that is not yet stored. Returns the number added.
pub async fn seed_categories(pool: &SqlitePool) -> Result<u64> {
    let mut added = 0;
    for key in CategoryKey::iter() {
        let result = sqlx::query(
            r#"
            INSERT INTO categories (key, description)
            VALUES ($1, $2)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(key.as_str())
        .bind(key.description())
        .execute(pool)
        .await?;
        added += result.rows_affected();
    }

    tracing::info!(added, "categories seeded");
    Ok(added)
}

pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, key, description FROM categories
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_catalogue_has_seven_keys_in_order() {
        let keys: Vec<&str> = CategoryKey::iter().map(CategoryKey::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "FINANCE_ACCOUNTING",
                "HUMAN_RESOURCES",
                "LEGAL_COMPLIANCE",
                "SALES_MARKETING",
                "OPERATIONS_TECHNICAL",
                "MANAGEMENT_INTERNAL",
                "OTHERS",
            ]
        );
    }

    #[test]
    fn test_normalize_is_case_sensitive_for_exact_match_only() {
        assert_eq!(normalize_category("OTHERS"), CategoryKey::Others);
        assert_eq!(normalize_category("legal_compliance"), CategoryKey::LegalCompliance);
        assert_eq!(
            normalize_category("Category: Sales_Marketing (quotation)"),
            CategoryKey::SalesMarketing
        );
    }

    #[test]
    fn test_normalize_unknown_falls_back_to_others() {
        assert_eq!(normalize_category(""), CategoryKey::Others);
        assert_eq!(normalize_category("Finance"), CategoryKey::Others);
    }

    #[test]
    fn test_serde_uses_key_form() {
        let json = serde_json::to_string(&CategoryKey::OperationsTechnical).unwrap();
        assert_eq!(json, "\"OPERATIONS_TECHNICAL\"");
        assert_eq!(CategoryKey::ManagementInternal.to_string(), "MANAGEMENT_INTERNAL");
    }

    #[test]
    fn test_categories_block_lists_descriptions() {
        let block = categories_block();
        assert_eq!(block.lines().count(), 7);
        assert!(block.starts_with("FINANCE_ACCOUNTING: Invoices, receipts"));
        assert!(block.ends_with("OTHERS: Miscellaneous documents that do not fit above categories"));
    }
}
