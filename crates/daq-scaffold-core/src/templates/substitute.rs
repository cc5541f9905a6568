//! Placeholder substitution
//!
//! Templates carry five placeholder markers. None of them is a substring of
//! another, so a single left-to-right scan can replace all of them at once and
//! text produced by a replacement is never looked at again.

/// A placeholder marker found in template text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `RenameMe`: target name, exact case
    TargetName,
    /// `PACKAGE`: package name, uppercase (header guards)
    PackageUpper,
    /// `RENAMEME`: target name, uppercase (header guards)
    TargetUpper,
    /// `package`: package name, lowercase (namespaces)
    PackageLower,
    /// `renameme`: target name, lowercase (schema and file names)
    TargetLower,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] = [
        Placeholder::TargetName,
        Placeholder::PackageUpper,
        Placeholder::TargetUpper,
        Placeholder::PackageLower,
        Placeholder::TargetLower,
    ];

    /// The literal text of the marker
    pub fn marker(&self) -> &'static str {
        match self {
            Placeholder::TargetName => "RenameMe",
            Placeholder::PackageUpper => "PACKAGE",
            Placeholder::TargetUpper => "RENAMEME",
            Placeholder::PackageLower => "package",
            Placeholder::TargetLower => "renameme",
        }
    }

    /// Value for this marker given a package and a target name
    pub fn value_for(&self, package: &str, target: &str) -> String {
        match self {
            Placeholder::TargetName => target.to_string(),
            Placeholder::PackageUpper => package.to_uppercase(),
            Placeholder::TargetUpper => target.to_uppercase(),
            Placeholder::PackageLower => package.to_lowercase(),
            Placeholder::TargetLower => target.to_lowercase(),
        }
    }
}

/// A set of marker -> value rules applied in one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    rules: Vec<(Placeholder, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for the given placeholders, valued from a package and target name
    pub fn for_placeholders(placeholders: &[Placeholder], package: &str, target: &str) -> Self {
        placeholders.iter().fold(Self::new(), |subs, p| {
            subs.with(*p, p.value_for(package, target))
        })
    }

    /// Add or replace the rule for `placeholder`
    pub fn with(mut self, placeholder: Placeholder, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.rules.iter_mut().find(|(p, _)| *p == placeholder) {
            Some(rule) => rule.1 = value,
            None => self.rules.push((placeholder, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Replace every marker in `text` that has a rule
    pub fn apply(&self, text: &str) -> String {
        if self.rules.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        'scan: while let Some(ch) = rest.chars().next() {
            for (placeholder, value) in &self.rules {
                if let Some(after) = rest.strip_prefix(placeholder.marker()) {
                    out.push_str(value);
                    rest = after;
                    continue 'scan;
                }
            }
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }

        out
    }
}
