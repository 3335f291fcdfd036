//! Tests for the account repository contract
