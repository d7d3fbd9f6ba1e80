//! CPU architecture of a release bucket.

use std::fmt;

/// CPU architecture a set of packages was built for.
///
/// The display form is the directory name used in the output tree
/// (`<system>/<arch>/`).
///
/// # Examples
///
/// ```
/// use ci_release_unpack::settings::Arch;
///
/// assert_eq!(Arch::X86_64.to_string(), "x86_64");
/// assert_eq!("i386".parse::<Arch>().unwrap(), Arch::I386);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 32-bit x86
    I386,
    /// x86_64 / AMD64
    X86_64,
    /// AArch64 / ARM64
    AArch64,
}

impl Arch {
    /// Directory name for this architecture
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::I386 => "i386",
            Arch::X86_64 => "x86_64",
            Arch::AArch64 => "aarch64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "i386" | "i686" | "x86" => Ok(Arch::I386),
            "x86_64" | "amd64" => Ok(Arch::X86_64),
            "aarch64" | "arm64" => Ok(Arch::AArch64),
            other => Err(format!("Unknown architecture: {other}")),
        }
    }
}
