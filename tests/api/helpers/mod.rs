
pub use test_app::{error_kind, TestApp, TestMerchant};
