//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{
    AMOUNT_DP, BALANCE_TOLERANCE, MAX_AMOUNT, MINOR_UNIT_DP, is_storable_amount, round_minor,
    within_tolerance,
};
pub use pagination::PageWindow;
