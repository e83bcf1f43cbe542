//! Mapping a verified Telegram identity onto a local user

use tracing::{debug, info, warn};

use super::error::AuthError;
use super::models::{ExternalIdentity, NewUser, ProfileChanges, User};
use super::repository::{RepoError, UserRepository};

/// Find or provision the local user for `identity`, keeping the stored
/// profile in sync with Telegram.
///
/// Performs at most one write: a create for a first login, an update when
/// the Telegram profile changed, nothing otherwise. A uniqueness conflict on
/// create means a concurrent login won the insert; the existing row is
/// re-read and used.
pub async fn resolve_user(
    users: &dyn UserRepository,
    identity: &ExternalIdentity,
) -> Result<User, AuthError> {
    let profile = NewUser::from(identity);

    if let Some(existing) = users.find_by_telegram_id(identity.external_id).await? {
        return sync_profile(users, existing, &profile).await;
    }

    match users.create_user(&profile).await {
        Ok(user) => {
            info!(
                user_id = %user.id,
                telegram_id = user.telegram_id,
                "Created user account via Telegram login"
            );
            Ok(user)
        }
        Err(RepoError::Conflict) => {
            warn!(
                telegram_id = identity.external_id,
                "Concurrent first login detected, using existing user"
            );
            let existing = users
                .find_by_telegram_id(identity.external_id)
                .await?
                .ok_or_else(|| {
                    AuthError::StoreUnavailable(
                        "uniqueness conflict but no existing user".to_string(),
                    )
                })?;
            sync_profile(users, existing, &profile).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn sync_profile(
    users: &dyn UserRepository,
    existing: User,
    profile: &NewUser,
) -> Result<User, AuthError> {
    let changes = ProfileChanges::diff(&existing, profile);
    if changes.is_empty() {
        debug!(user_id = %existing.id, "Stored profile up to date");
        return Ok(existing);
    }

    info!(
        user_id = %existing.id,
        fields = ?changes.changed_fields(),
        "Syncing profile from Telegram"
    );
    Ok(users.update_user(&existing.id, &changes).await?)
}
