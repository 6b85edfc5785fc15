//! Initial whole-scope suggestion catalog

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::scope::Scope;

/// Where a suggested name comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SuggestionCategory {
    Constant,
    GlobalVariable,
    LocalVariable,
    InstanceVariable,
    Method,
    PrivateMethod,
}

impl SuggestionCategory {
    /// Sweep order used when building a catalog
    pub const ALL: [SuggestionCategory; 6] = [
        SuggestionCategory::Constant,
        SuggestionCategory::GlobalVariable,
        SuggestionCategory::LocalVariable,
        SuggestionCategory::InstanceVariable,
        SuggestionCategory::Method,
        SuggestionCategory::PrivateMethod,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            SuggestionCategory::Constant => "constant",
            SuggestionCategory::GlobalVariable => "global_variables",
            SuggestionCategory::LocalVariable => "local_variables",
            SuggestionCategory::InstanceVariable => "instance_variables",
            SuggestionCategory::Method => "methods",
            SuggestionCategory::PrivateMethod => "private_methods",
        }
    }

    fn names<S: Scope>(self, scope: &S) -> Vec<String> {
        match self {
            SuggestionCategory::Constant => scope.constants(),
            SuggestionCategory::GlobalVariable => scope.global_variables(),
            SuggestionCategory::LocalVariable => scope.local_variables(),
            SuggestionCategory::InstanceVariable => scope.instance_variables(),
            SuggestionCategory::Method => scope.methods(),
            SuggestionCategory::PrivateMethod => scope.private_methods(),
        }
    }
}

impl fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SuggestionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.tag() == s)
            .ok_or_else(|| {
                let tags: Vec<&str> = Self::ALL.iter().map(|c| c.tag()).collect();
                format!("Unknown category '{}' (expected one of: {})", s, tags.join(", "))
            })
    }
}

/// Every name visible in a scope, tagged with its category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionCatalog {
    entries: BTreeMap<String, Vec<SuggestionCategory>>,
}

impl SuggestionCatalog {
    /// Sweep the scope category by category. A later sweep replaces the
    /// entry of any name an earlier sweep recorded.
    pub fn build<S: Scope>(scope: &S) -> Self {
        let mut entries = BTreeMap::new();
        for category in SuggestionCategory::ALL {
            for name in category.names(scope) {
                entries.insert(name, vec![category]);
            }
        }
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&[SuggestionCategory]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SuggestionCategory])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Names whose entry carries `category`
    pub fn names_in(&self, category: SuggestionCategory) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(move |(_, tags)| tags.contains(&category))
            .map(|(name, _)| name)
    }
}
