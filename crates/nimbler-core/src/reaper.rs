use jiff::Timestamp;
use tracing::{debug, info, instrument};

use crate::error::{Result, StoreError};
use crate::repository::LinkRepository;

/// Deletes every link that expired before `cutoff`, `batch_size` at a time.
///
/// Each page is removed in its own transaction, so a failure leaves earlier
/// pages deleted and the failing page intact. Returns the number of hashes
/// deleted.
#[instrument(skip(repository))]
pub async fn reap_expired<R>(repository: &R, cutoff: Timestamp, batch_size: u32) -> Result<usize>
where
    R: LinkRepository + ?Sized,
{
    if batch_size == 0 {
        return Err(StoreError::InvalidInput(
            "batch size must be positive".to_string(),
        ));
    }

    let mut reaped = 0;
    loop {
        let page = repository.list_expired_before(cutoff, batch_size).await?;
        if page.is_empty() {
            break;
        }

        repository.delete_batch(&page).await?;
        reaped += page.len();
        debug!(page = page.len(), reaped, "deleted expired links");

        if page.len() < batch_size as usize {
            break;
        }
    }

    info!(reaped, "finished reaping expired links");
    Ok(reaped)
}
