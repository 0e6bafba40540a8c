//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one duty against mock
//! adapters.  All tests run on the host with no sensors, relays or
//! sockets required.

mod logging_tests;
mod mock_hw;
mod server_tests;
