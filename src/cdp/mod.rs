pub mod client;

pub use client::CdpClient;
