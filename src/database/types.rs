use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Record status ---
/// Status codes stored in every `status_id` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i32)]
pub enum Status {
    Active = 1,
    InActive = 2,
    InProgress = 3,
    Expired = 4,
    Archive = 5,
    Refunded = 6,
    Deleted = 7,
    Completed = 8,
    PartialRefund = 9,
    Canceled = 10,
}

impl Status {
    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> Option<Self> {
        let status = match id {
            1 => Status::Active,
            2 => Status::InActive,
            3 => Status::InProgress,
            4 => Status::Expired,
            5 => Status::Archive,
            6 => Status::Refunded,
            7 => Status::Deleted,
            8 => Status::Completed,
            9 => Status::PartialRefund,
            10 => Status::Canceled,
            _ => return None,
        };
        Some(status)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Active => write!(f, "Active"),
            Status::InActive => write!(f, "In Active"),
            Status::InProgress => write!(f, "In Progress"),
            Status::Expired => write!(f, "Expired"),
            Status::Archive => write!(f, "Archive"),
            Status::Refunded => write!(f, "Refunded"),
            Status::Deleted => write!(f, "Deleted"),
            Status::Completed => write!(f, "Completed"),
            Status::PartialRefund => write!(f, "Partial Refund"),
            Status::Canceled => write!(f, "Canceled"),
        }
    }
}

// --- Account roles ---
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Customer,
    Admin,
    Employee,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "CUSTOMER"),
            Role::Admin => write!(f, "ADMIN"),
            Role::Employee => write!(f, "EMPLOYEE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_round_trip() {
        for id in 1..=10 {
            assert_eq!(Status::from_id(id).map(Status::id), Some(id));
        }
        assert_eq!(Status::from_id(42), None);
    }

    #[test]
    fn roles_serialize_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"EMPLOYEE\"").unwrap();
        assert_eq!(role, Role::Employee);
    }
}
