//! # Pushferry Pipeline
//!
//! The core of pushferry: pull notification messages, classify each one as a
//! torrent reference, resolve it into a submittable descriptor and hand it to
//! the download backend, then confirm back through the notification channel.
//!
//! usage:
//!
//! ```rust,ignore
//! use pushferry_pipeline::{Pipeline, PushbulletClient, Resolver, TransmissionClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = PushbulletClient::new("o.token")?;
//!     let sink = TransmissionClient::new(None, None)?;
//!     let pipeline = Pipeline::new(source, sink, Resolver::new()?, "device-iden");
//!     let report = pipeline.run_cycle(chrono::Utc::now() - chrono::Duration::minutes(30)).await?;
//!     println!("{report:?}");
//!     Ok(())
//! }
//! ```

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod classify;
mod conversions;
mod cycle;
mod pushbullet;
mod resolve;
mod transmission;

#[cfg(test)]
mod testutil;

pub use classify::classify;
pub use cycle::Pipeline;
pub use pushbullet::PushbulletClient;
pub use resolve::Resolver;
pub use transmission::TransmissionClient;
