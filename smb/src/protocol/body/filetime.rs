use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use smb_core::{SMBByteSize, SMBFromBytes, SMBParseResult, SMBToBytes};

/// Windows FILETIME: 100ns intervals since 1601-01-01 UTC.
#[derive(Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Default, Hash)]
pub struct FileTime(u64);

const INTERVALS_PER_SECOND: u64 = 10_000_000;
const SECONDS_BETWEEN_1601_AND_EPOCH: u64 = 11_644_473_600;

impl FileTime {
    pub fn new(intervals: u64) -> Self {
        Self(intervals)
    }

    pub fn from_unix(unix_timestamp: u64) -> Self {
        Self((unix_timestamp + SECONDS_BETWEEN_1601_AND_EPOCH) * INTERVALS_PER_SECOND)
    }

    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    pub fn intervals(&self) -> u64 {
        self.0
    }

    /// Seconds since the unix epoch, saturating at zero for earlier times.
    pub fn to_unix(&self) -> u64 {
        (self.0 / INTERVALS_PER_SECOND).saturating_sub(SECONDS_BETWEEN_1601_AND_EPOCH)
    }

    /// `None` for the zero value servers use when a time is unknown.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        if self.0 == 0 {
            return None;
        }
        let epoch_offset = SECONDS_BETWEEN_1601_AND_EPOCH * INTERVALS_PER_SECOND;
        let since = |ticks: u64| Duration::from_nanos(ticks.saturating_mul(100));
        if self.0 >= epoch_offset {
            UNIX_EPOCH.checked_add(since(self.0 - epoch_offset))
        } else {
            UNIX_EPOCH.checked_sub(since(epoch_offset - self.0))
        }
    }
}

impl From<SystemTime> for FileTime {
    fn from(value: SystemTime) -> Self {
        let ticks = match value.duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_nanos() / 100,
            Err(_) => 0,
        };
        Self((SECONDS_BETWEEN_1601_AND_EPOCH * INTERVALS_PER_SECOND).saturating_add(ticks as u64))
    }
}

impl SMBByteSize for FileTime {
    fn smb_byte_size(&self) -> usize {
        8
    }
}

impl SMBFromBytes for FileTime {
    fn smb_from_bytes(input: &[u8]) -> SMBParseResult<&[u8], Self> where Self: Sized {
        let (remaining, intervals) = u64::smb_from_bytes(input)?;
        Ok((remaining, Self(intervals)))
    }
}

impl SMBToBytes for FileTime {
    fn smb_to_bytes(&self) -> Vec<u8> {
        self.0.smb_to_bytes()
    }
}
