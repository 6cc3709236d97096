//! Media host adapter.
//!
//! Image hosting is an external collaborator; deployments wire a real
//! adapter for their provider here. The pass-through adapter below serves
//! payloads back as their own URLs (data URIs straight to the client), which
//! keeps local development and tests independent of any third party.

use async_trait::async_trait;

use crate::domain::ports::{MediaStore, MediaStoreError};

/// Media store that returns the submitted payload as the stored URL.
#[derive(Clone, Default)]
pub struct PassthroughMediaStore;

#[async_trait]
impl MediaStore for PassthroughMediaStore {
    async fn store(&self, payload: &str) -> Result<String, MediaStoreError> {
        if payload.is_empty() {
            return Err(MediaStoreError::upload("empty image payload"));
        }
        Ok(payload.to_owned())
    }

    async fn remove(&self, _url: &str) -> Result<(), MediaStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn payloads_come_back_as_urls() {
        let stored = PassthroughMediaStore
            .store("data:image/png;base64,AAAA")
            .await
            .expect("store payload");
        assert_eq!(stored, "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn empty_payloads_are_rejected() {
        let err = PassthroughMediaStore
            .store("")
            .await
            .expect_err("empty payload");
        assert!(matches!(err, MediaStoreError::Upload { .. }));
    }
}
