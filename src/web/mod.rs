//! Status pages over plain HTTP/1.0.
//!
//! | Module    | Role                                              |
//! |-----------|---------------------------------------------------|
//! | `request` | request-line parsing, header draining, routing    |
//! | `render`  | HTML fragments, page layout, graph data           |
//! | `server`  | serial accept loop ([`StateServer`])              |

pub mod render;
pub mod request;
pub mod server;

pub use server::StateServer;
