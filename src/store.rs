//! # Redis
//!
//! Document store for profiles.
//!
//! ## Requirements
//!
//! - Point lookups by user id and by email, no scans
//! - Small dataset, one JSON document per signed-up user
//! - Single-command atomicity for the one-document writes
//!
//! ## Implementation
//!
//! - `profile:{userId}` holds the serialized document
//! - `profile:email:{email}` holds the claimant user ids as a list, in
//!   claim order; lookup reads the head, so two profiles sharing an email
//!   resolve to the earliest claimant still alive
//! - A profile releases its claim when its email changes or it is deleted
//! - Document write and index upkeep go through one atomic pipeline
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

use crate::{error::AppError, profile::ProfileRecord};

const PROFILE_PREFIX: &str = "profile:";
const EMAIL_PREFIX: &str = "profile:email:";

/// Storage seam for profile documents. One read per lookup, one write per
/// upsert or delete; retries and caching stay out of this layer.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch(&self, user_id: &str) -> Result<Option<ProfileRecord>, AppError>;

    async fn fetch_by_email(&self, email: &str) -> Result<Option<ProfileRecord>, AppError>;

    /// Persists the record. `previous_email` is the email the stored copy
    /// had before this write, used to move a stale email claim.
    async fn save(
        &self,
        record: &ProfileRecord,
        previous_email: Option<&str>,
    ) -> Result<(), AppError>;

    /// Removes the record and releases its email claim.
    async fn delete(&self, record: &ProfileRecord) -> Result<(), AppError>;
}

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url).unwrap();
    let connection_manager = client
        .get_connection_manager_with_config(config)
        .await
        .unwrap();

    connection_manager
}

pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

fn profile_key(user_id: &str) -> String {
    format!("{PROFILE_PREFIX}{user_id}")
}

fn email_key(email: &str) -> String {
    format!("{EMAIL_PREFIX}{email}")
}

#[async_trait]
impl ProfileStore for RedisStore {
    async fn fetch(&self, user_id: &str) -> Result<Option<ProfileRecord>, AppError> {
        let mut connection = self.connection.clone();

        let document: Option<String> = connection.get(profile_key(user_id)).await?;

        match document {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<ProfileRecord>, AppError> {
        let mut connection = self.connection.clone();

        let claimant: Option<String> = connection.lindex(email_key(email), 0).await?;

        match claimant {
            Some(user_id) => self.fetch(&user_id).await,
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        record: &ProfileRecord,
        previous_email: Option<&str>,
    ) -> Result<(), AppError> {
        let mut connection = self.connection.clone();

        let document = serde_json::to_string(record)?;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .set(profile_key(&record.user_id), document)
            .ignore();

        // first write claims the email; an email change moves the claim
        match previous_email {
            None => {
                pipe.rpush(email_key(&record.email), &record.user_id)
                    .ignore();
            }
            Some(previous) if previous != record.email => {
                pipe.lrem(email_key(previous), 0, &record.user_id).ignore();
                pipe.rpush(email_key(&record.email), &record.user_id)
                    .ignore();
            }
            Some(_) => {}
        }

        pipe.exec_async(&mut connection).await?;

        Ok(())
    }

    async fn delete(&self, record: &ProfileRecord) -> Result<(), AppError> {
        let mut connection = self.connection.clone();

        redis::pipe()
            .atomic()
            .del(profile_key(&record.user_id))
            .ignore()
            .lrem(email_key(&record.email), 0, &record.user_id)
            .ignore()
            .exec_async(&mut connection)
            .await?;

        Ok(())
    }
}
