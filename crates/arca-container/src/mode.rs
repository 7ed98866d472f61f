use crate::error::{ContainerError, ContainerResult};

/// How a container file is opened. Fixed for the lifetime of the handle;
/// switching modes requires closing and reopening.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Open existing, no mutation allowed.
    ReadOnly,
    /// Open existing, mutation allowed; fails if the file is absent.
    ReadWrite,
    /// Create fresh, destroying any existing content at open time.
    Truncate,
    /// Create fresh, failing if the target already exists.
    Exclusive,
}

impl AccessMode {
    /// Decode the legacy numeric encoding (0, 1, 2, 4). Any other value is
    /// an invalid-access-mode error.
    pub fn from_raw(raw: u8) -> ContainerResult<Self> {
        match raw {
            0 => Ok(Self::ReadOnly),
            1 => Ok(Self::ReadWrite),
            2 => Ok(Self::Truncate),
            4 => Ok(Self::Exclusive),
            other => Err(ContainerError::InvalidAccessMode(other.to_string())),
        }
    }

    /// The legacy numeric encoding.
    pub fn raw(&self) -> u8 {
        match self {
            Self::ReadOnly => 0,
            Self::ReadWrite => 1,
            Self::Truncate => 2,
            Self::Exclusive => 4,
        }
    }

    /// Whether this mode permits mutation.
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

impl std::str::FromStr for AccessMode {
    type Err = ContainerError;

    /// Accepts the kebab-case names plus the single-letter shorthands
    /// `r`, `rw`, `w`, `x`.
    fn from_str(s: &str) -> ContainerResult<Self> {
        match s {
            "read-only" | "r" => Ok(Self::ReadOnly),
            "read-write" | "rw" => Ok(Self::ReadWrite),
            "truncate" | "w" => Ok(Self::Truncate),
            "exclusive" | "x" => Ok(Self::Exclusive),
            other => Err(ContainerError::InvalidAccessMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ReadOnly => "read-only",
            Self::ReadWrite => "read-write",
            Self::Truncate => "truncate",
            Self::Exclusive => "exclusive",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        for mode in [
            AccessMode::ReadOnly,
            AccessMode::ReadWrite,
            AccessMode::Truncate,
            AccessMode::Exclusive,
        ] {
            assert_eq!(AccessMode::from_raw(mode.raw()).unwrap(), mode);
        }
    }

    #[test]
    fn unknown_raw_rejected() {
        for raw in [3u8, 5, 7, 255] {
            let err = AccessMode::from_raw(raw).unwrap_err();
            assert!(matches!(err, ContainerError::InvalidAccessMode(_)));
        }
    }

    #[test]
    fn parse_names() {
        assert_eq!("read-only".parse::<AccessMode>().unwrap(), AccessMode::ReadOnly);
        assert_eq!("rw".parse::<AccessMode>().unwrap(), AccessMode::ReadWrite);
        assert_eq!("truncate".parse::<AccessMode>().unwrap(), AccessMode::Truncate);
        assert_eq!("x".parse::<AccessMode>().unwrap(), AccessMode::Exclusive);
        assert!("append".parse::<AccessMode>().is_err());
    }

    #[test]
    fn writability() {
        assert!(!AccessMode::ReadOnly.is_writable());
        assert!(AccessMode::ReadWrite.is_writable());
        assert!(AccessMode::Truncate.is_writable());
        assert!(AccessMode::Exclusive.is_writable());
    }
}
