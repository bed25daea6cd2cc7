//! Exhibition and pop-up listings for the map and calendar views.

use std::sync::Arc;

use popspot_domain::{Exhibition, ExhibitionQuery, MapBounds, QueryParams};

use super::error::ApiResult;
use crate::client::AuthenticatedClient;

/// Read access to listings.
#[derive(Clone)]
pub struct ExhibitionApi {
    client: Arc<AuthenticatedClient>,
}

impl ExhibitionApi {
    /// Creates the API over a shared client.
    pub const fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    /// Lists events matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is invalid or the request fails.
    pub async fn search(&self, query: &ExhibitionQuery) -> ApiResult<Vec<Exhibition>> {
        query.validate()?;
        self.client.get_json("/exhibitions", query.to_params()).await
    }

    /// Lists events inside the visible map area.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is invalid or the request fails.
    pub async fn in_bounds(
        &self,
        bounds: MapBounds,
        query: ExhibitionQuery,
    ) -> ApiResult<Vec<Exhibition>> {
        self.search(&query.within(bounds)).await
    }

    /// Lists events open during a calendar month.
    ///
    /// Kind, category and viewport filters of `filters` are kept; its
    /// date range is replaced by the month.
    ///
    /// # Errors
    ///
    /// Returns an error if the month is invalid or the request fails.
    pub async fn for_month(
        &self,
        year: i32,
        month: u32,
        filters: ExhibitionQuery,
    ) -> ApiResult<Vec<Exhibition>> {
        let month_range = ExhibitionQuery::for_month(year, month)?;
        let query = ExhibitionQuery {
            from: month_range.from,
            to: month_range.to,
            ..filters
        };
        self.search(&query).await
    }

    /// Fetches one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; a missing event is `Status { status: 404, .. }`.
    pub async fn detail(&self, id: i64) -> ApiResult<Exhibition> {
        self.client
            .get_json(&format!("/exhibitions/{id}"), QueryParams::new())
            .await
    }
}
