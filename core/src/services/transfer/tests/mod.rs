//! Tests for the transfer service
