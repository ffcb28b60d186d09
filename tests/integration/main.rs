//! Integration tests for Blog-Audit
//!
//! These tests use wiremock to stand in for blog hosts and the analysis API.

mod fetcher_tests;
mod pipeline_tests;
mod sitemap_tests;
