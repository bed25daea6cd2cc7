//! Subcommand execution.

use std::sync::Arc;

use anyhow::bail;
use popspot_application::{ApiError, AuthApi, AuthenticatedClient, ExhibitionApi, WishlistApi};
use popspot_domain::{ExhibitionQuery, MapBounds};
use serde::Serialize;
use serde_json::json;

use crate::cli::{Command, ListArgs, WishlistCommand};

/// Runs `command` and returns its pretty-printed JSON output.
pub async fn run(command: Command, client: Arc<AuthenticatedClient>) -> anyhow::Result<String> {
    let result = dispatch(command, client).await;
    match result {
        Ok(output) => Ok(output),
        Err(error) if error.requires_login() => {
            bail!("session expired or missing, sign in again with `popspot login --code <CODE>`")
        }
        Err(error) if error.is_not_found() => bail!("not found"),
        Err(error) => Err(error.into()),
    }
}

async fn dispatch(command: Command, client: Arc<AuthenticatedClient>) -> Result<String, ApiError> {
    match command {
        Command::Login { code } => {
            let user = AuthApi::new(client).login_with_kakao(&code).await?;
            render(&user)
        }
        Command::Logout => {
            AuthApi::new(client).logout().await?;
            render(&json!({ "loggedOut": true }))
        }
        Command::Whoami => {
            let user = AuthApi::new(client).me().await?;
            render(&user)
        }
        Command::Exhibitions(args) => {
            let api = ExhibitionApi::new(client);
            let month = args.month;
            let filters = list_query(args)?;
            let events = match month {
                Some((year, month)) => api.for_month(year, month, filters).await?,
                None => api.search(&filters).await?,
            };
            render(&events)
        }
        Command::Show { id } => {
            let event = ExhibitionApi::new(client).detail(id).await?;
            render(&event)
        }
        Command::Wishlist(command) => {
            let api = WishlistApi::new(client);
            match command {
                WishlistCommand::List => render(&api.list().await?),
                WishlistCommand::Add { id } => {
                    api.add(id).await?;
                    render(&json!({ "id": id, "wishlisted": true }))
                }
                WishlistCommand::Remove { id } => {
                    api.remove(id).await?;
                    render(&json!({ "id": id, "wishlisted": false }))
                }
            }
        }
    }
}

fn list_query(args: ListArgs) -> Result<ExhibitionQuery, ApiError> {
    let bounds = args
        .bounds
        .map(|[south, west, north, east]| MapBounds::new(south, west, north, east))
        .transpose()?;
    Ok(ExhibitionQuery {
        kind: args.kind,
        category: args.category,
        from: args.from,
        to: args.to,
        bounds,
        page: args.page,
        size: args.size,
    })
}

fn render<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| ApiError::Decode(e.to_string()))
}
