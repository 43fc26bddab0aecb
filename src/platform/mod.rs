use serde::Serialize;
use std::fmt;

/// Architecture tokens recognised as the trailing segment of a platform
/// string. Anything else is treated as part of the version.
pub const ARCHITECTURES: &[&str] = &["x86_64", "i386", "i86pc", "sun4v", "powerpc"];

/// Parsed `family[-version][-architecture]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlatformDescriptor {
    family: String,
    version: Option<String>,
    architecture: Option<String>,
}

impl PlatformDescriptor {
    pub fn new(
        family: impl Into<String>,
        version: Option<String>,
        architecture: Option<String>,
    ) -> Self {
        Self {
            family: family.into(),
            version,
            architecture,
        }
    }

    /// Split a raw platform string into its parts.
    ///
    /// The family is everything before the first `-`. The remainder is the
    /// version, unless its last `-` separated token is a known architecture,
    /// in which case that token is peeled off:
    ///
    /// - `debian-i386` -> (`debian`, none, `i386`)
    /// - `windows-server-2012r2-i386` -> (`windows`, `server-2012r2`, `i386`)
    /// - `ubuntu-14.04` -> (`ubuntu`, `14.04`, none)
    ///
    /// This never fails; odd input just leaves fields empty.
    pub fn parse(raw: &str) -> Self {
        let (family, rest) = match raw.split_once('-') {
            Some((family, rest)) => (family, Some(rest)),
            None => (raw, None),
        };

        let Some(rest) = rest else {
            return Self::new(family, None, None);
        };

        let (head, tail) = match rest.rsplit_once('-') {
            Some((head, tail)) => (head, tail),
            None => ("", rest),
        };

        if is_architecture(tail) {
            let version = (!head.is_empty()).then(|| head.to_string());
            Self::new(family, version, Some(tail.to_string()))
        } else {
            Self::new(family, Some(rest.to_string()), None)
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn architecture(&self) -> Option<&str> {
        self.architecture.as_deref()
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.family)?;
        if let Some(version) = &self.version {
            write!(f, "-{version}")?;
        }
        if let Some(architecture) = &self.architecture {
            write!(f, "-{architecture}")?;
        }
        Ok(())
    }
}

impl From<&str> for PlatformDescriptor {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

pub fn is_architecture(token: &str) -> bool {
    ARCHITECTURES.contains(&token)
}
