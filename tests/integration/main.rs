//! Integration tests against a running server.
//!
//! Requires a migrated database and a server started with the bootstrap
//! administrator from `.env.example`. Run with: cargo test -- --ignored

mod api_tests;
