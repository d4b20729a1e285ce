//! Core types for NissaHub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod api;
pub mod cart;
pub mod id;
pub mod price;

pub use api::{
    ApiResponse, ApiStatus, DiscussionPost, DiscussionReply, Message, PostCreated, ReplyCreated,
    SessionLogin, UserProfile,
};
pub use cart::{Cart, CartItem, Product};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
