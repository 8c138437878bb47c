//! End-to-end tests through the public API.

mod mock_source;
mod scenarios;
