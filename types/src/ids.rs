use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("{kind} must be a positive integer (got {value:?})")]
    NotANumber { kind: &'static str, value: String },
    #[error("{kind} must be greater than zero")]
    Zero { kind: &'static str },
}

/// Backend primary keys are positive integers; zero is never a valid id.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub fn new(id: u64) -> Result<Self, IdParseError> {
                if id == 0 {
                    return Err(IdParseError::Zero { kind: $kind });
                }
                Ok(Self(id))
            }

            #[must_use]
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let id = trimmed
                    .parse::<u64>()
                    .map_err(|_| IdParseError::NotANumber {
                        kind: $kind,
                        value: trimmed.to_string(),
                    })?;
                Self::new(id)
            }
        }
    };
}

entity_id!(
    /// A relay user. Also the value carried by the `x-dev-user-id` header.
    UserId,
    "user_id"
);
entity_id!(TeamId, "team_id");
entity_id!(OrganizationId, "organization_id");
entity_id!(PlanId, "plan_id");
entity_id!(
    /// A billing-system identity bound to a user or team.
    CustomerId,
    "customer_id"
);
entity_id!(SubscriptionId, "subscription_id");
entity_id!(InvoiceId, "invoice_id");
entity_id!(
    /// A plan/currency to payment-processor price association.
    MappingId,
    "mapping_id"
);
