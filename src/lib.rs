//! # fanclash-rs
//!
//! Wager slip engine and HTTP clients for the Fanclash peer-to-peer sports
//! betting platform.
//!
//! A slip walks one user's bet from outcome selection to a confirmed or
//! failed submission. Payouts are computed with exact decimal arithmetic and
//! every submission carries an idempotency key, so transport retries never
//! place the same wager twice.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fanclash_rs::{placement, Config, FanclashApiClient, Outcome};
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Load configuration from config.toml
//! let config = Config::new()?;
//! let session = config
//!     .session
//!     .clone()
//!     .ok_or_else(|| anyhow::anyhow!("No session configured"))?;
//!
//! let client = FanclashApiClient::new(&config)?;
//!
//! // Open a slip on a fresh odds snapshot
//! let mut slip = placement::open_slip(&client, "match-42").await?;
//! slip.select_outcome(Outcome::Home)?;
//! slip.set_stake(Decimal::new(50, 0), Decimal::new(200, 0))?;
//! println!("Potential payout: {}", slip.potential_payout());
//!
//! let receipt = placement::submit_slip(&mut slip, &client, &session).await?;
//! println!("Placed wager {}", receipt.wager_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Create a `config.toml` file:
//!
//! ```toml
//! [api]
//! catalog_url = "https://api.fanclash.example/v1"
//! wager_url = "https://api.fanclash.example/v1"
//! timeout_secs = 10
//!
//! [retry]
//! max_attempts = 3
//!
//! [session]
//! user_id = "u-123"
//! name = "Ada"
//! ```

pub mod api_client;
pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod placement;
pub mod retry;
pub mod slip;

// Re-export commonly used types at the crate root
pub use api_client::FanclashApiClient;
pub use client::{MatchCatalogClient, WagerSubmissionClient};
pub use config::Config;
pub use dto::*;
pub use error::{ClientError, PlacementError, SlipError, SnapshotError};
pub use slip::{SlipStatus, SlipView, WagerSlipEngine};
