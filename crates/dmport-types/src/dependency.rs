//! Dependency declarations.
//!
//! A [`Dependency`] binds a short alias to an external address so that
//! documents can use `ALIAS:Path` references instead of repeating full
//! addresses. Declarations are parsed from a document's `_meta_` block and
//! merged upward into a package-scoped table.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// How a declared dependency is fetched.
///
/// - `Dmss`: resolvable directly within the document store.
/// - `Http`: fetched with a public HTTP GET.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyProtocol {
    Dmss,
    Http,
}

impl DependencyProtocol {
    /// The scheme prefix this protocol produces in resolved addresses.
    pub fn scheme(&self) -> &'static str {
        match self {
            DependencyProtocol::Dmss => "dmss",
            DependencyProtocol::Http => "http",
        }
    }
}

impl fmt::Display for DependencyProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for DependencyProtocol {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dmss" => Ok(DependencyProtocol::Dmss),
            "http" => Ok(DependencyProtocol::Http),
            other => Err(TypeError::UnknownProtocol {
                protocol: other.to_string(),
            }),
        }
    }
}

/// One external dependency declaration: an alias bound to an address.
///
/// Equality is defined over (alias, protocol, address, version) and ignores
/// the optional `kind` marker — conflict detection compares what the alias
/// resolves to, not how the declaration was typed.
#[derive(Clone, Debug, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub alias: String,
    pub protocol: DependencyProtocol,
    pub address: String,
    #[serde(default)]
    pub version: String,
    /// The declaration's own type reference, when present in the source
    /// document (e.g. `CORE:Dependency`). Not part of equality.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias
            && self.protocol == other.protocol
            && self.address == other.address
            && self.version == other.version
    }
}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias.hash(state);
        self.protocol.hash(state);
        self.address.hash(state);
        self.version.hash(state);
    }
}

/// Discriminator values for `referenceType` on Reference-typed objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    /// Points at another document in the store; the address is resolved.
    Link,
    /// Points at a document through an intermediate; treated like a link.
    Pointer,
    /// Points at uncontained companion content (a file on disk or an
    /// uploaded binary); the address is a local path or `$<id>`.
    Storage,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Link => "link",
            ReferenceType::Pointer => "pointer",
            ReferenceType::Storage => "storage",
        }
    }
}

impl FromStr for ReferenceType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(ReferenceType::Link),
            "pointer" => Ok(ReferenceType::Pointer),
            "storage" => Ok(ReferenceType::Storage),
            other => Err(TypeError::UnknownReferenceType {
                value: other.to_string(),
            }),
        }
    }
}
