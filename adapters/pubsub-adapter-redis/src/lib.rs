//! Redis publish/subscribe adapter.
//!
//! Publishers and subscribers are created from a Redis URL
//! (`redis://[user:password@]host[:port][/db]`). Connections are opened
//! lazily: the URL is checked when the handle is created, the server is
//! contacted on the first publish or subscribe.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use async_trait::async_trait;
use futures::{StreamExt, future};
use redis::{AsyncCommands, Client, Msg, aio::MultiplexedConnection};
use std::sync::Arc;
use tokio::sync::OnceCell;

use parlay::{
	prelude::*,
	pubsub_adapter::{MessageStream, PubSubAdapter, PubSubMessage, Publisher, Subscriber},
};

fn open_client(url: &str) -> ClResult<Client> {
	Client::open(url).map_err(|err| Error::ConfigError(format!("invalid Redis URL {}: {}", url, err)))
}

fn redis_error(err: redis::RedisError) -> Error {
	Error::NetworkError(format!("redis: {}", err))
}

fn to_message(msg: &Msg) -> Option<PubSubMessage> {
	match msg.get_payload::<String>() {
		Ok(payload) => Some(PubSubMessage {
			channel: msg.get_channel_name().into(),
			payload: payload.into(),
		}),
		Err(err) => {
			warn!("Dropping message on {}: {}", msg.get_channel_name(), err);
			None
		}
	}
}

// Publisher //
//***********//
pub struct RedisPublisher {
	client: Client,
	conn: OnceCell<MultiplexedConnection>,
}

impl std::fmt::Debug for RedisPublisher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RedisPublisher")
			.field("addr", &self.client.get_connection_info().addr)
			.field("connected", &self.conn.initialized())
			.finish()
	}
}

impl RedisPublisher {
	async fn connection(&self) -> ClResult<MultiplexedConnection> {
		let conn = self
			.conn
			.get_or_try_init(|| async {
				debug!("Connecting publisher to {:?}", self.client.get_connection_info().addr);
				self.client.get_multiplexed_async_connection().await.map_err(redis_error)
			})
			.await?;
		Ok(conn.clone())
	}
}

#[async_trait]
impl Publisher for RedisPublisher {
	async fn publish(&self, channel: &str, message: &str) -> ClResult<()> {
		let mut conn = self.connection().await?;
		let _receivers: i64 = conn.publish(channel, message).await.map_err(redis_error)?;
		Ok(())
	}
}

// Subscriber //
//************//
#[derive(Debug)]
pub struct RedisSubscriber {
	client: Client,
}

#[async_trait]
impl Subscriber for RedisSubscriber {
	/// Every call opens its own pub/sub connection, closed when the
	/// returned stream is dropped
	async fn subscribe(&self, channels: &[&str]) -> ClResult<MessageStream> {
		let mut pubsub = self.client.get_async_pubsub().await.map_err(redis_error)?;
		for channel in channels {
			pubsub.subscribe(*channel).await.map_err(redis_error)?;
		}
		info!("Subscribed to {:?}", channels);

		let stream = pubsub.into_on_message().filter_map(|msg| future::ready(to_message(&msg)));
		Ok(Box::pin(stream))
	}
}

// RedisPubSub //
//*************//
#[derive(Debug, Default)]
pub struct RedisPubSub;

impl RedisPubSub {
	pub fn new() -> Self {
		Self
	}
}

impl PubSubAdapter for RedisPubSub {
	fn create_publisher(&self, url: &str) -> ClResult<Arc<dyn Publisher>> {
		Ok(Arc::new(RedisPublisher { client: open_client(url)?, conn: OnceCell::new() }))
	}

	fn create_subscriber(&self, url: &str) -> ClResult<Arc<dyn Subscriber>> {
		Ok(Arc::new(RedisSubscriber { client: open_client(url)? }))
	}
}


// vim: ts=4
