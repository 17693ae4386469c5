//! Tests for authentication service

mod fixtures;
