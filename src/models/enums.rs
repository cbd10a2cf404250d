use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(UserType {
    Patient => "patient",
    Doctor => "doctor",
    Admin => "admin",
});

str_enum!(RecordKind {
    GeneralInfo => "general_info",
    MedicalInfo => "medical_info",
    Allergy => "allergy",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn user_type_round_trip() {
        for variant in [UserType::Patient, UserType::Doctor, UserType::Admin] {
            assert_eq!(UserType::from_str(variant.as_str()).unwrap(), variant);
        }
    }

    #[test]
    fn record_kind_round_trip() {
        for variant in [RecordKind::GeneralInfo, RecordKind::MedicalInfo, RecordKind::Allergy] {
            assert_eq!(RecordKind::from_str(variant.as_str()).unwrap(), variant);
        }
    }

    #[test]
    fn display_uses_storage_form() {
        assert_eq!(RecordKind::MedicalInfo.to_string(), "medical_info");
        assert_eq!(UserType::Doctor.to_string(), "doctor");
    }

    #[test]
    fn serde_matches_storage_form() {
        assert_eq!(serde_json::to_string(&UserType::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&RecordKind::GeneralInfo).unwrap(),
            "\"general_info\""
        );
    }

    #[test]
    fn invalid_enum_returns_error() {
        let result = UserType::from_str("nurse");
        assert!(matches!(
            result,
            Err(DatabaseError::InvalidEnum { ref field, ref value })
                if field == "UserType" && value == "nurse"
        ));
    }
}
