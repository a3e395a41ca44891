//! Shared fixtures for integration tests
#![allow(dead_code)]

pub mod catalog;
pub mod data_root;
