//! End-to-end tests against wiremock documentation sites

mod crawl_tests;
mod extraction_tests;
mod support;
