//! Status repository
//!
//! Fetches homework statuses from the review API.

use async_trait::async_trait;
use homework_client::{ClientError, ReviewClient, StatusPayload};

/// Source of homework status payloads
#[async_trait]
pub trait StatusRepository: Send + Sync {
    /// Fetches statuses changed since `from_date`
    ///
    /// Performs a single request; retrying is left to the caller.
    async fn fetch(&self, from_date: i64) -> Result<StatusPayload, ClientError>;
}

/// HTTP implementation of StatusRepository
pub struct HttpStatusRepository {
    client: ReviewClient,
}

impl HttpStatusRepository {
    pub fn new(client: ReviewClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusRepository for HttpStatusRepository {
    async fn fetch(&self, from_date: i64) -> Result<StatusPayload, ClientError> {
        self.client.fetch(from_date).await
    }
}
