//! Default chart of accounts seeded at company onboarding.

use tally_shared::types::CompanyId;

use super::types::{AccountType, NewAccount};

/// Code of the default cash account.
pub const CASH: &str = "1000";
/// Code of the default bank account.
pub const BANK: &str = "1100";
/// Code of the default accounts receivable account.
pub const ACCOUNTS_RECEIVABLE: &str = "1200";
/// Code of the default VAT input (recoverable) account.
pub const VAT_INPUT: &str = "1300";
/// Code of the default accounts payable account.
pub const ACCOUNTS_PAYABLE: &str = "2000";
/// Code of the default VAT output (payable) account.
pub const VAT_OUTPUT: &str = "2100";
/// Code of the default owner's equity account.
pub const OWNER_EQUITY: &str = "3000";
/// Code of the default sales account.
pub const SALES: &str = "4000";
/// Code of the default general expenses account.
pub const GENERAL_EXPENSES: &str = "6000";

// (code, name, localized name, type, vat, system)
const DEFAULT_CHART: &[(&str, &str, &str, AccountType, bool, bool)] = &[
    (CASH, "Cash", "النقدية", AccountType::Asset, false, true),
    (BANK, "Bank", "البنك", AccountType::Asset, false, true),
    (ACCOUNTS_RECEIVABLE, "Accounts Receivable", "الذمم المدينة", AccountType::Asset, false, true),
    (VAT_INPUT, "VAT Input", "ضريبة القيمة المضافة - مدخلات", AccountType::Asset, true, true),
    (ACCOUNTS_PAYABLE, "Accounts Payable", "الذمم الدائنة", AccountType::Liability, false, true),
    (VAT_OUTPUT, "VAT Output", "ضريبة القيمة المضافة - مخرجات", AccountType::Liability, true, true),
    (OWNER_EQUITY, "Owner's Equity", "حقوق الملكية", AccountType::Equity, false, true),
    (SALES, "Sales", "المبيعات", AccountType::Income, false, true),
    ("4900", "Other Income", "إيرادات أخرى", AccountType::Income, false, false),
    (GENERAL_EXPENSES, "General Expenses", "مصروفات عامة", AccountType::Expense, false, true),
    ("6100", "Rent", "الإيجار", AccountType::Expense, false, false),
    ("6200", "Utilities", "المرافق", AccountType::Expense, false, false),
    ("6300", "Salaries", "الرواتب", AccountType::Expense, false, false),
    ("6400", "Office Supplies", "مستلزمات مكتبية", AccountType::Expense, false, false),
];

/// Returns the onboarding chart of accounts for a company, ordered by code.
#[must_use]
pub fn default_chart_of_accounts(company_id: CompanyId) -> Vec<NewAccount> {
    DEFAULT_CHART
        .iter()
        .map(
            |&(code, name, localized, account_type, is_vat_account, is_system_account)| NewAccount {
                company_id,
                code: code.to_string(),
                name: name.to_string(),
                localized_name: Some(localized.to_string()),
                account_type,
                is_vat_account,
                is_system_account,
            },
        )
        .collect()
}
