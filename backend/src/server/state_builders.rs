//! Builders for HTTP state and the storage stack behind it.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::Clock;
use tracing::info;

use lists::domain::ports::{FixtureListsCommand, FixtureListsQuery};
use lists::inbound::http::state::HttpState;
use lists::outbound::persistence::DieselListMetadataRepository;
use lists::outbound::stack::StorageStack;
use lists::settings::AppSettings;

/// Open the metadata mirror and wire entity workers according to
/// `settings`.
///
/// # Errors
///
/// Returns [`io::Error`] when the data directory cannot be created or the
/// mirror cannot be opened and migrated.
pub async fn build_storage(
    settings: &AppSettings,
    clock: Arc<dyn Clock>,
) -> io::Result<StorageStack> {
    let location = settings.store_location();
    location.prepare()?;
    let metadata_url = settings.metadata_url();
    let mirror = DieselListMetadataRepository::open(metadata_url.as_str())
        .await
        .map_err(|err| io::Error::other(format!("metadata mirror {metadata_url}: {err}")))?;
    info!(
        location = ?location,
        metadata = %metadata_url,
        mailbox_capacity = settings.mailbox_capacity(),
        "storage ready"
    );
    Ok(StorageStack::assemble(
        location,
        mirror,
        clock,
        settings.mailbox_capacity(),
    ))
}

/// Build handler state from the storage stack, falling back to fixtures.
pub fn build_http_state(storage: Option<&StorageStack>) -> web::Data<HttpState> {
    let state = match storage {
        Some(stack) => HttpState::new(stack.service.clone(), stack.service.clone()),
        None => HttpState::new(Arc::new(FixtureListsCommand), Arc::new(FixtureListsQuery)),
    };
    web::Data::new(state)
}
