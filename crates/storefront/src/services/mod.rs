//! Clients for services outside the cart.
//!
//! # Services
//!
//! - `marketplace` - Discussion, review, session, and order endpoints of the
//!   marketplace web app

pub mod marketplace;

pub use marketplace::{ApiError, MarketplaceClient};
