//! Document store plumbing for the table migrator.
//!
//! Provides the attribute value model shared by every pipeline stage, the
//! scan expression builder, and the network client for the store's API.

pub mod client;
pub mod expression;
pub mod types;

pub use client::{DynamoClient, DynamoError, ScanPage};
pub use expression::{EqualsCondition, RenderedScanExpression, ScanExpression};
pub use types::{AttributeValue, Item, item_to_json};
