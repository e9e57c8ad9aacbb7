// Upstream provider module

mod client;
mod provider;

pub use client::UpstreamClient;
pub use provider::Provider;
