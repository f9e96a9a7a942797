//! Integration tests for configuration build and single-field updates.

pub mod helpers;
pub mod update_field_tests;
