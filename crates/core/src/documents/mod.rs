//! Document posting.
//!
//! Invoice arithmetic and the builders that turn expense receipts and sales
//! invoices into balanced journal entries.

pub mod invoice;
pub mod posting;

pub use invoice::{InvoiceLine, InvoiceTotals, compute_invoice_totals};
pub use posting::{
    ExpensePosting, PostingHeader, SalesInvoicePosting, build_expense_entry,
    build_sales_invoice_entry,
};
