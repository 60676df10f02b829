use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::UserId;

/// Fixed bearer-token lifetime.
pub const TOKEN_TTL_HOURS: i64 = 10;

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims Stockroom encodes into a bearer token:
/// the user identifier plus the issued-at/expiry window. Roles are looked up
/// from storage on every request rather than baked into the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the authenticated user's identifier.
    pub sub: UserId,

    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl AccessClaims {
    /// Build claims for `user_id` expiring [`TOKEN_TTL_HOURS`] after `now`.
    pub fn issue(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_claims_expire_ten_hours_out() {
        let now = Utc::now();
        let claims = AccessClaims::issue(UserId::new(), now);

        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }
}
