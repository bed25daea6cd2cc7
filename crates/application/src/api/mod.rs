//! Typed wrappers over the PopSpot REST API.
//!
//! All calls go through [`AuthenticatedClient`], so token handling is
//! invisible here.

mod auth;
mod error;
mod exhibitions;
mod wishlist;

pub use auth::AuthApi;
pub use error::{ApiError, ApiResult};
pub use exhibitions::ExhibitionApi;
pub use wishlist::WishlistApi;

use popspot_domain::{QueryParams, RequestSpec, ResponseSpec};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::AuthenticatedClient;

impl AuthenticatedClient {
    /// Sends `request` and requires a 2xx status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for non-success statuses, or the client error.
    pub async fn execute(&self, request: RequestSpec) -> ApiResult<ResponseSpec> {
        let response = self.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status {
                status: response.status.as_u16(),
                body: response.text(),
            })
        }
    }

    /// Sends `request` and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on failure statuses or undecodable bodies.
    pub async fn fetch_json<T: DeserializeOwned>(&self, request: RequestSpec) -> ApiResult<T> {
        let response = self.execute(request).await?;
        response.json().map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `GET path?query`, decoding the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on failure statuses or undecodable bodies.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: QueryParams,
    ) -> ApiResult<T> {
        self.fetch_json(RequestSpec::get(path).with_query(query))
            .await
    }

    /// `POST path` with a JSON body, decoding the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on failure statuses or undecodable bodies.
    pub async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = RequestSpec::post(path).with_json(body)?;
        self.fetch_json(request).await
    }

    /// `DELETE path`, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Returns an error on failure statuses.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.execute(RequestSpec::delete(path)).await.map(|_| ())
    }
}
