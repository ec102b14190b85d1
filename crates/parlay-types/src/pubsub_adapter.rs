//! Adapter that creates publish/subscribe endpoints for live queries.

use async_trait::async_trait;
use futures_core::Stream;
use std::{fmt::Debug, pin::Pin, sync::Arc};

use crate::prelude::*;

/// A message received on a subscribed channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PubSubMessage {
	pub channel: Box<str>,
	pub payload: Box<str>,
}

pub type MessageStream = Pin<Box<dyn Stream<Item = PubSubMessage> + Send>>;

#[async_trait]
pub trait Publisher: Debug + Send + Sync {
	async fn publish(&self, channel: &str, message: &str) -> ClResult<()>;
}

#[async_trait]
pub trait Subscriber: Debug + Send + Sync {
	/// Subscribes to the given channels and returns the incoming messages
	async fn subscribe(&self, channels: &[&str]) -> ClResult<MessageStream>;
}

/// Factory for publishers and subscribers bound to a broker URL
pub trait PubSubAdapter: Debug + Send + Sync {
	fn create_publisher(&self, url: &str) -> ClResult<Arc<dyn Publisher>>;

	fn create_subscriber(&self, url: &str) -> ClResult<Arc<dyn Subscriber>>;
}

// vim: ts=4
