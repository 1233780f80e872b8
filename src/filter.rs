/// Interface name prefixes excluded from the aggregate by default: loopback
/// plus the usual virtual machine, container and bridge devices.
pub const DEFAULT_IGNORED_PREFIXES: [&str; 5] = ["lo", "vir", "vbox", "docker", "br-"];

/// Decides which interfaces count toward the aggregate.
///
/// Matching is a plain, case-sensitive prefix test, so `virtual0` is excluded
/// by the `vir` prefix just like `virbr0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceFilter {
    prefixes: Vec<String>,
}

impl InterfaceFilter {
    /// Create a filter ignoring every interface starting with one of `prefixes`
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns false iff `name` starts with any ignored prefix
    #[must_use]
    pub fn should_include(&self, name: &str) -> bool {
        !self
            .prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// The configured ignore prefixes
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl Default for InterfaceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED_PREFIXES)
    }
}
