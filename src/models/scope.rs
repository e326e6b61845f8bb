//! Resource families that cached queries belong to

use std::borrow::Cow;
use std::fmt;

/// A logical resource family. Its root token is the first token of every
/// cache address built for it.
///
/// The root token names the family. Period awareness changes where ALL
/// entries live, so a root token must always be defined with the same period
/// awareness; `Scope::new("expenses")` is not `Scope::EXPENSES`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    root: Cow<'static, str>,
    period_aware: bool,
}

impl Scope {
    pub const ACCOUNTS: Scope = Scope::fixed("accounts", false);
    pub const EXPENSE_CATEGORIES: Scope = Scope::fixed("expense-categories", false);
    pub const INCOME_CATEGORIES: Scope = Scope::fixed("income-categories", false);
    pub const EXPENSES: Scope = Scope::fixed("expenses", true);
    pub const INCOMES: Scope = Scope::fixed("incomes", true);
    pub const CUSTOM_FIELDS: Scope = Scope::fixed("custom-fields", false);

    const fn fixed(root: &'static str, period_aware: bool) -> Self {
        Self {
            root: Cow::Borrowed(root),
            period_aware,
        }
    }

    /// Create a scope whose records carry no selectable date field
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: Cow::Owned(root.into()),
            period_aware: false,
        }
    }

    /// Mark the scope as having a selectable date field (due date vs
    /// confirmation date). Its ALL view then lives under the filter namespace.
    pub fn with_date_field(mut self) -> Self {
        self.period_aware = true;
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn is_period_aware(&self) -> bool {
        self.period_aware
    }

    /// All built-in scopes of the finance app
    pub fn builtin() -> [Scope; 6] {
        [
            Self::ACCOUNTS,
            Self::EXPENSE_CATEGORIES,
            Self::INCOME_CATEGORIES,
            Self::EXPENSES,
            Self::INCOMES,
            Self::CUSTOM_FIELDS,
        ]
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)
    }
}
