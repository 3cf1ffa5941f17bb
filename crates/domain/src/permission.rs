use std::collections::BTreeMap;
use std::str::FromStr;

use consorciatech_core::AppError;
use serde::{Deserialize, Serialize};

/// Resource categories guarded by the CRM permission matrix.
///
/// The set is closed: adding a category is a deploy-time change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceCategory {
    /// Client pipelines (billing, recycling).
    Clients,
    /// Consortium and credit product catalog.
    Products,
    /// Proposal forms.
    Proposals,
    /// Financial transactions.
    Transactions,
    /// CRM user accounts.
    Users,
    /// Suppliers.
    Suppliers,
    /// Cost centers.
    CostCenters,
    /// Expense categories.
    ExpenseCategories,
    /// Quiz builders.
    Quizzes,
    /// Financial institutions.
    FinancialInstitutions,
    /// Commission tables.
    Commissions,
}

impl ResourceCategory {
    /// Returns the stable storage key for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Products => "products",
            Self::Proposals => "proposals",
            Self::Transactions => "transactions",
            Self::Users => "users",
            Self::Suppliers => "suppliers",
            Self::CostCenters => "costCenters",
            Self::ExpenseCategories => "expenseCategories",
            Self::Quizzes => "quizzes",
            Self::FinancialInstitutions => "financialInstitutions",
            Self::Commissions => "commissions",
        }
    }

    /// Returns all known categories.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceCategory] = &[
            ResourceCategory::Clients,
            ResourceCategory::Products,
            ResourceCategory::Proposals,
            ResourceCategory::Transactions,
            ResourceCategory::Users,
            ResourceCategory::Suppliers,
            ResourceCategory::CostCenters,
            ResourceCategory::ExpenseCategories,
            ResourceCategory::Quizzes,
            ResourceCategory::FinancialInstitutions,
            ResourceCategory::Commissions,
        ];

        ALL
    }
}

impl FromStr for ResourceCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown resource category '{value}'")))
    }
}

/// CRUD flags granted on one resource category.
///
/// Flags missing from a stored document read as not granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudPermissions {
    /// Allows creating records.
    pub create: bool,
    /// Allows reading records.
    pub read: bool,
    /// Allows updating records.
    pub update: bool,
    /// Allows deleting records.
    pub delete: bool,
}

impl CrudPermissions {
    /// Grants every operation.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
            delete: true,
        }
    }

    /// Grants nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            create: false,
            read: false,
            update: false,
            delete: false,
        }
    }

    /// Returns whether all four operations are granted.
    #[must_use]
    pub fn grants_all(&self) -> bool {
        self.create && self.read && self.update && self.delete
    }
}

/// Mapping from resource category to granted CRUD flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix(BTreeMap<ResourceCategory, CrudPermissions>);

impl PermissionMatrix {
    /// Full access to every known category.
    #[must_use]
    pub fn full() -> Self {
        Self(
            ResourceCategory::all()
                .iter()
                .map(|category| (*category, CrudPermissions::full()))
                .collect(),
        )
    }

    /// A matrix without any entries.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the flags for a category, if an entry exists.
    #[must_use]
    pub fn get(&self, category: ResourceCategory) -> Option<CrudPermissions> {
        self.0.get(&category).copied()
    }

    /// Sets the flags for one category.
    pub fn set(&mut self, category: ResourceCategory, permissions: CrudPermissions) {
        self.0.insert(category, permissions);
    }

    /// Returns whether every known category has an entry.
    #[must_use]
    pub fn covers_all_categories(&self) -> bool {
        ResourceCategory::all()
            .iter()
            .all(|category| self.0.contains_key(category))
    }

    /// Returns whether every known category grants every operation.
    #[must_use]
    pub fn is_full(&self) -> bool {
        ResourceCategory::all().iter().all(|category| {
            self.get(*category)
                .is_some_and(|permissions| permissions.grants_all())
        })
    }

    /// Overwrites entries present in `other`, leaving the rest untouched.
    pub fn merge_from(&mut self, other: &Self) {
        for (category, permissions) in &other.0 {
            self.0.insert(*category, *permissions);
        }
    }

    /// Iterates over entries in category order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceCategory, CrudPermissions)> + '_ {
        self.0
            .iter()
            .map(|(category, permissions)| (*category, *permissions))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the matrix has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ResourceCategory, CrudPermissions)> for PermissionMatrix {
    fn from_iter<T: IntoIterator<Item = (ResourceCategory, CrudPermissions)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{CrudPermissions, PermissionMatrix, ResourceCategory};

    #[test]
    fn eleven_categories_are_known() {
        assert_eq!(ResourceCategory::all().len(), 11);
    }

    #[test]
    fn category_storage_key_roundtrip() {
        for category in ResourceCategory::all() {
            let parsed = ResourceCategory::from_str(category.as_str());
            assert_eq!(parsed.ok(), Some(*category));
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(ResourceCategory::from_str("invoices").is_err());
    }

    #[test]
    fn full_matrix_grants_everything() {
        let matrix = PermissionMatrix::full();
        assert!(matrix.covers_all_categories());
        assert!(matrix.is_full());
        assert_eq!(
            matrix.get(ResourceCategory::Commissions),
            Some(CrudPermissions::full())
        );
    }

    #[test]
    fn merge_overwrites_present_entries_only() {
        let mut stored = PermissionMatrix::empty();
        stored.set(ResourceCategory::Clients, CrudPermissions::none());
        stored.set(
            ResourceCategory::Quizzes,
            CrudPermissions {
                read: true,
                ..CrudPermissions::none()
            },
        );

        let mut incoming = PermissionMatrix::empty();
        incoming.set(ResourceCategory::Clients, CrudPermissions::full());
        stored.merge_from(&incoming);

        assert_eq!(
            stored.get(ResourceCategory::Clients),
            Some(CrudPermissions::full())
        );
        assert_eq!(
            stored
                .get(ResourceCategory::Quizzes)
                .map(|permissions| permissions.read),
            Some(true)
        );
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn matrix_serializes_as_object_keyed_by_storage_key() {
        let json = serde_json::to_value(PermissionMatrix::full())
            .unwrap_or_else(|_| serde_json::Value::Null);
        let object = json.as_object().cloned().unwrap_or_default();

        assert_eq!(object.len(), 11);
        assert_eq!(
            object.get("costCenters"),
            Some(&serde_json::json!({
                "create": true,
                "read": true,
                "update": true,
                "delete": true
            }))
        );
    }
}
