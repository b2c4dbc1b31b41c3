use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::util::flags_helper::impl_smb_for_enum;

#[repr(u16)]
#[derive(Debug, Eq, PartialEq, Hash, TryFromPrimitive, Serialize, Deserialize, Copy, Clone, Ord, PartialOrd)]
#[allow(non_camel_case_types)]
pub enum SMBDialect {
    V2_0_2 = 0x202,
    V2_1_0 = 0x210,
    V3_0_0 = 0x300,
    V3_0_2 = 0x302,
    V3_1_1 = 0x311,
    V2_X_X = 0x2FF,
}

impl SMBDialect {
    /// Dialects this client negotiates, oldest first.
    pub const SUPPORTED: [SMBDialect; 4] = [Self::V2_0_2, Self::V2_1_0, Self::V3_0_0, Self::V3_0_2];

    pub fn is_smb3(&self) -> bool {
        *self != Self::V2_X_X && *self as u16 >= 0x300
    }

    /// Multi-credit requests exist from SMB 2.1 on.
    pub fn supports_multi_credit(&self) -> bool {
        *self != Self::V2_X_X && *self as u16 >= 0x210
    }
}

impl_smb_for_enum! { SMBDialect: u16 }

#[cfg(test)]
mod tests {
    use super::*;
    use smb_core::{SMBFromBytes, SMBToBytes};

    #[test]
    fn dialect_values_match_protocol() {
        assert_eq!(SMBDialect::V2_0_2 as u16, 0x0202);
        assert_eq!(SMBDialect::V2_1_0 as u16, 0x0210);
        assert_eq!(SMBDialect::V3_0_0 as u16, 0x0300);
        assert_eq!(SMBDialect::V3_0_2 as u16, 0x0302);
        assert_eq!(SMBDialect::V3_1_1 as u16, 0x0311);
        assert_eq!(SMBDialect::V2_X_X as u16, 0x02FF);
    }

    #[test]
    fn is_smb3_classification() {
        assert!(!SMBDialect::V2_0_2.is_smb3());
        assert!(!SMBDialect::V2_1_0.is_smb3());
        assert!(!SMBDialect::V2_X_X.is_smb3());
        assert!(SMBDialect::V3_0_0.is_smb3());
        assert!(SMBDialect::V3_0_2.is_smb3());
        assert!(!SMBDialect::V2_0_2.supports_multi_credit());
        assert!(SMBDialect::V2_1_0.supports_multi_credit());
    }

    #[test]
    fn unknown_dialect_is_malformed() {
        assert_eq!(SMBDialect::V3_0_2.smb_to_bytes(), [0x02, 0x03]);
        assert!(SMBDialect::smb_from_bytes(&[0x00, 0x04]).is_err());
    }
}
