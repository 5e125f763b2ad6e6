//! Package descriptors and the ordered registry the orchestrator walks.

use std::fmt;

use crate::error::{PmError, Result};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_RECIPE: &str = "make";

/// Longest name accepted as a single path segment.
const MAX_NAME_LEN: usize = 255;

/// Build command for a package, split on literal spaces.
///
/// There is no quoting or escaping: `cc -o "my tool" main.c` yields the
/// arguments `"my` and `tool"`. Runs of spaces do not produce empty arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    raw: String,
    program: String,
    args: Vec<String>,
}

impl Recipe {
    /// Split a recipe line. Returns `None` when it holds no command.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut tokens = raw.split(' ').filter(|token| !token.is_empty());
        let program = tokens.next()?.to_string();
        let args = tokens.map(str::to_string).collect();
        Some(Self {
            raw: raw.to_string(),
            program,
            args,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One package: where its source lives and how to build it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    name: String,
    source: String,
    branch: String,
    recipe: Recipe,
}

impl PackageDescriptor {
    /// Create a descriptor tracking `main` and built with `make`.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if let Err(reason) = validate_name(&name) {
            return Err(PmError::InvalidName { name, reason });
        }
        let recipe = Recipe::parse(DEFAULT_RECIPE).ok_or_else(|| PmError::EmptyRecipe {
            package: name.clone(),
        })?;
        Ok(Self {
            name,
            source: source.into(),
            branch: DEFAULT_BRANCH.to_string(),
            recipe,
        })
    }

    /// Track a different upstream branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Result<Self> {
        let branch = branch.into();
        if branch.is_empty() || branch.chars().any(char::is_whitespace) {
            return Err(PmError::InvalidBranch {
                package: self.name,
                branch,
            });
        }
        self.branch = branch;
        Ok(self)
    }

    /// Build with a different recipe line.
    pub fn with_recipe(mut self, recipe: &str) -> Result<Self> {
        self.recipe = Recipe::parse(recipe).ok_or_else(|| PmError::EmptyRecipe {
            package: self.name.clone(),
        })?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Upstream reference whose tip this package follows.
    pub fn remote_ref(&self) -> String {
        format!("origin/{}", self.branch)
    }
}

/// Check that a package name can be used verbatim as one path segment.
pub fn validate_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name == "." || name == ".." {
        return Err("name is a relative path component");
    }
    if name.contains('/') || name.contains('\\') {
        return Err("name contains a path separator");
    }
    if name.contains('\0') {
        return Err("name contains a NUL byte");
    }
    if name.len() > MAX_NAME_LEN {
        return Err("name is longer than 255 bytes");
    }
    Ok(())
}

/// Ordered set of packages, unique by name.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    packages: Vec<PackageDescriptor>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_packages(packages: impl IntoIterator<Item = PackageDescriptor>) -> Result<Self> {
        let mut registry = Self::new();
        for package in packages {
            registry.add(package)?;
        }
        Ok(registry)
    }

    /// Append a package, keeping registration order.
    pub fn add(&mut self, package: PackageDescriptor) -> Result<()> {
        if self.get(package.name()).is_some() {
            return Err(PmError::DuplicatePackage(package.name));
        }
        self.packages.push(package);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PackageDescriptor> {
        self.packages.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackageDescriptor> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl<'a> IntoIterator for &'a PackageRegistry {
    type Item = &'a PackageDescriptor;
    type IntoIter = std::slice::Iter<'a, PackageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
