//! Write path: delegate to the Catalog Store, then fan out invalidation.
//!
//! Invalidation runs after a successful commit regardless of cache state;
//! its failures never fail the request.

use std::sync::Arc;

use thiserror::Error;

use sightline_api_types::Envelope;

use crate::application::catalog::{
    CatalogStore, CreateSightParams, StoreError, UpdateSightParams,
};
use crate::application::codec::{self, CodecError};
use crate::application::invalidation::InvalidationCoordinator;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("sight not found")]
    NotFound,
    #[error(transparent)]
    Store(StoreError),
    #[error("failed to encode sight {id}")]
    Encode {
        id: i64,
        #[source]
        source: CodecError,
    },
}

impl From<StoreError> for WriteError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => WriteError::NotFound,
            other => WriteError::Store(other),
        }
    }
}

pub struct SightWriteService {
    store: Arc<dyn CatalogStore>,
    invalidation: Arc<InvalidationCoordinator>,
}

impl SightWriteService {
    pub fn new(store: Arc<dyn CatalogStore>, invalidation: Arc<InvalidationCoordinator>) -> Self {
        Self { store, invalidation }
    }

    pub async fn create(&self, params: CreateSightParams) -> Result<Envelope, WriteError> {
        let record = self.store.create(params).await?;
        self.invalidation.after_create().await;

        let id = record.id;
        let value = codec::encode_sight(&record)
            .map_err(|source| WriteError::Encode { id, source })?;
        Ok(Envelope {
            data: Some(value),
            ..Envelope::message("sight created")
        })
    }

    pub async fn update(&self, id: i64, params: UpdateSightParams) -> Result<Envelope, WriteError> {
        let record = self.store.update(id, params).await?;
        self.invalidation.after_write(id).await;

        let value = codec::encode_sight(&record)
            .map_err(|source| WriteError::Encode { id, source })?;
        Ok(Envelope {
            data: Some(value),
            ..Envelope::message("sight updated")
        })
    }

    pub async fn delete(&self, id: i64) -> Result<Envelope, WriteError> {
        self.store.delete(id).await?;
        self.invalidation.after_write(id).await;
        Ok(Envelope::message("sight deleted"))
    }
}
