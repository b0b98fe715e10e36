//! Status/tier/role enums mapping to SMALLINT columns.
//!
//! Each variant's discriminant matches the value documented in the
//! migration comments (1-based).

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database column value.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Generation job lifecycle. Jobs are created Processing and move to
    /// exactly one terminal state, never back.
    JobStatus {
        Processing = 1,
        Completed = 2,
        Failed = 3,
    }
}

impl JobStatus {
    /// Human-readable name matching the public API (`"PROCESSING"` etc).
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Processing => "PROCESSING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(JobStatus::Processing),
            2 => Some(JobStatus::Completed),
            3 => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

define_status_enum! {
    /// Subscription tier.
    UserTier {
        Free = 1,
        Pro = 2,
        Enterprise = 3,
    }
}

impl UserTier {
    pub fn as_str(self) -> &'static str {
        match self {
            UserTier::Free => "FREE",
            UserTier::Pro => "PRO",
            UserTier::Enterprise => "ENTERPRISE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "FREE" => Some(UserTier::Free),
            "PRO" => Some(UserTier::Pro),
            "ENTERPRISE" => Some(UserTier::Enterprise),
            _ => None,
        }
    }
}

define_status_enum! {
    /// Account role.
    UserRole {
        User = 1,
        Admin = 2,
    }
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::User => "USER",
            UserRole::Admin => "ADMIN",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "USER" => Some(UserRole::User),
            "ADMIN" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_ids_match_migration_comments() {
        assert_eq!(JobStatus::Processing.id(), 1);
        assert_eq!(JobStatus::Completed.id(), 2);
        assert_eq!(JobStatus::Failed.id(), 3);
    }

    #[test]
    fn job_status_round_trips_through_id() {
        for status in [JobStatus::Processing, JobStatus::Completed, JobStatus::Failed] {
            assert_eq!(JobStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(JobStatus::from_id(9), None);
    }

    #[test]
    fn tier_and_role_names_round_trip() {
        assert_eq!(UserTier::from_name("PRO"), Some(UserTier::Pro));
        assert_eq!(UserTier::Pro.as_str(), "PRO");
        assert_eq!(UserRole::from_name("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_name("ROOT"), None);
    }
}
