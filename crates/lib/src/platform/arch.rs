use std::fmt;

/// CPU architecture variants a DXC build can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X86_64,
  Aarch64,
  X86,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    Self::parse(std::env::consts::ARCH)
  }

  /// Parse an architecture name, accepting the aliases used by MSVC and
  /// package managers (`x64`, `amd64`, `armv8`, `arm64`, ...).
  pub fn parse(name: &str) -> Option<Self> {
    match name.trim().to_ascii_lowercase().as_str() {
      "x86_64" | "x86-64" | "amd64" | "x64" => Some(Self::X86_64),
      "aarch64" | "arm64" | "armv8" => Some(Self::Aarch64),
      "x86" | "i386" | "i686" => Some(Self::X86),
      _ => None,
    }
  }

  /// Returns the lowercase string identifier for this architecture
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
      Self::X86 => "x86",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn msvc_and_conan_aliases() {
    assert_eq!(Arch::parse("x64"), Some(Arch::X86_64));
    assert_eq!(Arch::parse("armv8"), Some(Arch::Aarch64));
    assert_eq!(Arch::parse("ARM64"), Some(Arch::Aarch64));
    assert_eq!(Arch::parse("i686"), Some(Arch::X86));
  }

  #[test]
  fn unknown_arch_is_none() {
    assert_eq!(Arch::parse("riscv64"), None);
  }
}
