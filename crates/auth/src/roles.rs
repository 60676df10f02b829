use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::DomainError;

/// Coarse permission tier gating write access to protected resources.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "CLIENT")]
    Client,

    #[serde(rename = "ADMINISTRATOR")]
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Administrator => "ADMINISTRATOR",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLIENT" => Ok(Role::Client),
            "ADMINISTRATOR" => Ok(Role::Administrator),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Client, Role::Administrator] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn only_administrator_is_admin() {
        assert!(Role::Administrator.is_admin());
        assert!(!Role::Client.is_admin());
    }

    #[test]
    fn unknown_role_fails_to_parse() {
        assert!("MANAGER".parse::<Role>().is_err());
    }
}
