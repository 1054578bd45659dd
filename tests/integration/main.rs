//! End-to-end tests of the audit pipeline, run against scripted renderers and mock servers

mod audit_tests;
mod crawl_tests;
mod report_tests;
mod support;
