//! Wishlist calls.

use std::sync::Arc;

use popspot_domain::{Exhibition, QueryParams, RequestSpec, WishlistItem};

use super::error::ApiResult;
use crate::client::AuthenticatedClient;

/// The user's saved exhibitions.
#[derive(Clone)]
pub struct WishlistApi {
    client: Arc<AuthenticatedClient>,
}

impl WishlistApi {
    /// Creates the API over a shared client.
    pub const fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    /// Lists wishlisted events, most recent first as returned by the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(&self) -> ApiResult<Vec<WishlistItem>> {
        self.client.get_json("/wishlist", QueryParams::new()).await
    }

    /// Adds an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn add(&self, exhibition_id: i64) -> ApiResult<()> {
        self.client
            .execute(RequestSpec::post(format!("/wishlist/{exhibition_id}")))
            .await
            .map(|_| ())
    }

    /// Removes an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn remove(&self, exhibition_id: i64) -> ApiResult<()> {
        self.client
            .delete(&format!("/wishlist/{exhibition_id}"))
            .await
    }

    /// Flips the wishlist state of `exhibition` and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn toggle(&self, exhibition: &Exhibition) -> ApiResult<bool> {
        if exhibition.wishlisted {
            self.remove(exhibition.id).await?;
            Ok(false)
        } else {
            self.add(exhibition.id).await?;
            Ok(true)
        }
    }
}
