use std::collections::BTreeSet;

use tracing::info;

use crate::auth::auth::AuthUser;
use crate::auth::policy::Operation;
use crate::error::{AppError, AppResult};
use crate::store::Store;

/// Drops duplicates and rejects an empty selection.
pub(crate) fn distinct_ids(ids: &[u64]) -> AppResult<Vec<u64>> {
    let ids: Vec<u64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Err(AppError::validation("ids must contain at least one id"));
    }
    Ok(ids)
}

/// Bulk approve (`approved = true`) or cancel approval of check-ins in the
/// caller's company. Returns how many records matched.
pub async fn set_checkin_approval(
    store: &dyn Store,
    auth: &AuthUser,
    ids: &[u64],
    approved: bool,
) -> AppResult<u64> {
    auth.require(Operation::ApproveCheckins)?;
    let ids = distinct_ids(ids)?;

    let matched = store
        .set_records_approved(auth.company_id, &ids, approved)
        .await?;

    info!(
        by = auth.user_id,
        requested = ids.len(),
        matched,
        approved,
        "Check-in approval updated"
    );
    Ok(matched)
}
