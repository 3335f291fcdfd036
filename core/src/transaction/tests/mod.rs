//! Tests for the transaction machinery

#[cfg(test)]
mod context_tests;
#[cfg(test)]
mod coordinator_tests;
