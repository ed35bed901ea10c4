//! modelgate - one OpenAI-compatible endpoint in front of many LLM backends
//!
//! A background refresher polls every backend's `/models` catalog and
//! publishes a [`directory::Directory`] mapping model ids to backends.
//! Each inbound request is routed by its `model` field against the current
//! snapshot (unknown models go to the first configured backend) and the
//! backend's response is streamed back unbuffered.

pub mod api;
pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod directory;
pub mod forward;
pub mod logging;
pub mod metrics;
pub mod routing;
