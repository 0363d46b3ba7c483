//! Syntax-driven reference resolution.
//!
//! A reference string is classified by its shape alone, in priority order:
//!
//! 1. Fully qualified (`dmss://...`, `http://...`), the `_default_`
//!    sentinel, or an escape marker (`^`, `~`) — returned unchanged.
//! 2. `ALIAS:Path` — looked up in the dependency table.
//! 3. `./Path` or `../Path` — relative to the referencing file's folder.
//! 4. `/Path` — absolute within the destination's data source.
//! 5. `Path` — relative to the import's root package.
//!
//! The produced address is always of the form
//! `<protocol>://<data-source>/<package>/.../<entity>`.

use dmport_types::core_types::DEFAULT_SENTINEL;
use dmport_types::Dependency;

use crate::dependencies::DependencyTable;
use crate::error::{ResolveError, ResolveResult};

/// Marks a reference to a local id within the same document.
const LOCAL_ID_MARKER: char = '^';
/// Marks a reference resolved against the current context at access time.
const CONTEXT_MARKER: char = '~';

/// The five syntactic shapes a reference string can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceScheme {
    /// Already absolute, a sentinel, or an escape marker.
    Qualified,
    /// `ALIAS:Path`, resolved via the dependency table.
    Alias,
    /// `./Path` / `../Path`, relative to the referencing file.
    Dotted,
    /// `/Path`, absolute within the data source.
    DataSource,
    /// Bare path, relative to the root package.
    Package,
}

/// Classify a reference string. Total: every string maps to a scheme.
pub fn classify_reference(reference: &str) -> ReferenceScheme {
    if reference.contains("://")
        || reference == DEFAULT_SENTINEL
        || reference.starts_with(LOCAL_ID_MARKER)
        || reference.starts_with(CONTEXT_MARKER)
    {
        return ReferenceScheme::Qualified;
    }
    if has_alias_separator(reference) {
        return ReferenceScheme::Alias;
    }
    if reference.starts_with('.') {
        return ReferenceScheme::Dotted;
    }
    if reference.starts_with('/') {
        return ReferenceScheme::DataSource;
    }
    ReferenceScheme::Package
}

/// An alias separator is a `:` appearing before any `/`.
fn has_alias_separator(reference: &str) -> bool {
    match (reference.find(':'), reference.find('/')) {
        (Some(colon), Some(slash)) => colon < slash,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Resolve a raw reference into a canonical absolute address.
///
/// `destination` is the remote location the import targets
/// (`data-source` or `data-source/parent/packages`). `file_path` is the
/// referencing file's logical path within the import, rooted at the root
/// package name (e.g. `MyRootPackage/Moorings/Mooring.json`); it is
/// required for dotted and package-relative references.
///
/// Callers are expected to guard empty reference strings upstream; an
/// empty address is meaningless but not automatically malformed.
pub fn resolve_reference(
    reference: &str,
    dependencies: &DependencyTable,
    destination: &str,
    file_path: Option<&str>,
) -> ResolveResult<String> {
    let destination = destination.trim_matches('/');
    match classify_reference(reference) {
        ReferenceScheme::Qualified => Ok(reference.to_string()),
        ReferenceScheme::Alias => resolve_alias(reference, dependencies),
        ReferenceScheme::Dotted => {
            let file_path = require_file_path(reference, destination, file_path)?;
            let folder = parent_folder(file_path);
            let joined = if folder.is_empty() {
                reference.to_string()
            } else {
                format!("{folder}/{reference}")
            };
            Ok(format!("dmss://{destination}/{}", normalize_path(&joined)))
        }
        ReferenceScheme::DataSource => {
            // Absolute within the whole store: rooted at the data source,
            // dropping any package-relative part of the destination.
            let data_source = destination.split('/').next().unwrap_or(destination);
            Ok(format!("dmss://{data_source}{reference}"))
        }
        ReferenceScheme::Package => {
            let file_path = require_file_path(reference, destination, file_path)?;
            let root_package = file_path.split('/').next().unwrap_or(file_path);
            Ok(format!("dmss://{destination}/{root_package}/{reference}"))
        }
    }
}

/// Resolve an `ALIAS:Path` reference through the dependency table.
fn resolve_alias(reference: &str, dependencies: &DependencyTable) -> ResolveResult<String> {
    let (alias, path) = reference
        .split_once(':')
        .expect("alias reference always contains ':'");
    let dependency: &Dependency =
        dependencies
            .get(alias)
            .ok_or_else(|| ResolveError::UnknownDependencyAlias {
                alias: alias.to_string(),
                reference: reference.to_string(),
            })?;
    let address = dependency.address.trim_matches(|c| c == ' ' || c == '/');
    let path = path.trim_matches(|c| c == ' ' || c == '/');
    Ok(format!("{}://{address}/{path}", dependency.protocol.scheme()))
}

fn require_file_path<'a>(
    reference: &str,
    destination: &str,
    file_path: Option<&'a str>,
) -> ResolveResult<&'a str> {
    file_path.ok_or_else(|| ResolveError::UnresolvableReference {
        reference: reference.to_string(),
        file_path: String::new(),
        destination: destination.to_string(),
    })
}

/// The folder containing `file_path` (everything before the last `/`).
pub(crate) fn parent_folder(file_path: &str) -> &str {
    file_path
        .rsplit_once('/')
        .map(|(folder, _)| folder)
        .unwrap_or("")
}

/// Collapse `.` and `..` segments in a relative path.
///
/// `..` pops a preceding segment when one exists and is kept otherwise.
pub(crate) fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(&last) if last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmport_types::DependencyProtocol;
    use std::collections::HashMap;

    fn table() -> DependencyTable {
        let mut table = HashMap::new();
        table.insert(
            "CORE".to_string(),
            Dependency {
                alias: "CORE".into(),
                protocol: DependencyProtocol::Dmss,
                address: "system/SIMOS".into(),
                version: "0.0.1".into(),
                kind: None,
            },
        );
        table.insert(
            "SINTEF".to_string(),
            Dependency {
                alias: "SINTEF".into(),
                protocol: DependencyProtocol::Http,
                address: "marine-models.sintef.com/Signals".into(),
                version: "1.2.3".into(),
                kind: None,
            },
        );
        table
    }

    #[test]
    fn classify_qualified() {
        assert_eq!(classify_reference("dmss://ds/Root/X"), ReferenceScheme::Qualified);
        assert_eq!(classify_reference("http://models.example.com/X"), ReferenceScheme::Qualified);
        assert_eq!(classify_reference("_default_"), ReferenceScheme::Qualified);
        assert_eq!(classify_reference("^.attributes[0]"), ReferenceScheme::Qualified);
        assert_eq!(classify_reference("~/current"), ReferenceScheme::Qualified);
    }

    #[test]
    fn classify_alias() {
        assert_eq!(classify_reference("CORE:Blueprint"), ReferenceScheme::Alias);
        assert_eq!(classify_reference("CORE:sub/path"), ReferenceScheme::Alias);
    }

    #[test]
    fn colon_after_slash_is_not_an_alias() {
        assert_eq!(classify_reference("folder/odd:name"), ReferenceScheme::Package);
    }

    #[test]
    fn classify_dotted_absolute_package() {
        assert_eq!(classify_reference("./Mooring"), ReferenceScheme::Dotted);
        assert_eq!(classify_reference("../WindTurbine"), ReferenceScheme::Dotted);
        assert_eq!(classify_reference("/AnotherPackage/MyType"), ReferenceScheme::DataSource);
        assert_eq!(classify_reference("Moorings/Mooring"), ReferenceScheme::Package);
        assert_eq!(classify_reference("WindTurbine"), ReferenceScheme::Package);
    }

    #[test]
    fn qualified_reference_is_unchanged() {
        let resolved = resolve_reference("dmss://system/SIMOS/Blueprint", &table(), "ds", None).unwrap();
        assert_eq!(resolved, "dmss://system/SIMOS/Blueprint");
    }

    #[test]
    fn sentinel_is_unchanged() {
        let resolved = resolve_reference("_default_", &table(), "ds", None).unwrap();
        assert_eq!(resolved, "_default_");
    }

    #[test]
    fn alias_resolves_through_dependency_table() {
        let resolved =
            resolve_reference("CORE:Blueprint", &table(), "ds", Some("Root/x.json")).unwrap();
        assert_eq!(resolved, "dmss://system/SIMOS/Blueprint");
    }

    #[test]
    fn alias_with_http_protocol() {
        let resolved = resolve_reference("SINTEF:Default", &table(), "ds", None).unwrap();
        assert_eq!(resolved, "http://marine-models.sintef.com/Signals/Default");
    }

    #[test]
    fn alias_strips_surrounding_slashes() {
        let mut deps = table();
        deps.get_mut("CORE").unwrap().address = "/system/SIMOS/".into();
        let resolved = resolve_reference("CORE:/Blueprint/", &deps, "ds", None).unwrap();
        assert_eq!(resolved, "dmss://system/SIMOS/Blueprint");
    }

    #[test]
    fn unknown_alias_is_an_error() {
        let err = resolve_reference("MISSING:X", &table(), "ds", None).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnknownDependencyAlias { alias, .. } if alias == "MISSING"
        ));
    }

    #[test]
    fn dotted_reference_normalizes_against_parent_folder() {
        let resolved = resolve_reference(
            "../WindTurbine",
            &table(),
            "ds",
            Some("Root/Moorings/SpecialMooring.json"),
        )
        .unwrap();
        assert_eq!(resolved, "dmss://ds/Root/WindTurbine");
    }

    #[test]
    fn dotted_sibling_reference() {
        let resolved = resolve_reference(
            "./Mooring",
            &table(),
            "test_data_source/XRoot",
            Some("MyPackage/Moorings/SpecialMooring.json"),
        )
        .unwrap();
        assert_eq!(resolved, "dmss://test_data_source/XRoot/MyPackage/Moorings/Mooring");
    }

    #[test]
    fn dotted_reference_climbing_two_levels() {
        let resolved = resolve_reference(
            "../../Moorings/Mooring",
            &table(),
            "ds",
            Some("MyPackage/A/SubFolder/doc.json"),
        )
        .unwrap();
        assert_eq!(resolved, "dmss://ds/MyPackage/Moorings/Mooring");
    }

    #[test]
    fn data_source_reference_is_rooted_at_data_source() {
        let resolved = resolve_reference(
            "/AnotherPackage/MyType",
            &table(),
            "test_data_source/XRoot",
            Some("MyPackage/Moorings/SpecialMooring.json"),
        )
        .unwrap();
        assert_eq!(resolved, "dmss://test_data_source/AnotherPackage/MyType");
    }

    #[test]
    fn package_relative_reference() {
        let resolved = resolve_reference(
            "Moorings/Mooring",
            &table(),
            "ds",
            Some("MyPackage/myTurbine.json"),
        )
        .unwrap();
        assert_eq!(resolved, "dmss://ds/MyPackage/Moorings/Mooring");
    }

    #[test]
    fn package_relative_requires_file_path() {
        assert!(matches!(
            resolve_reference("WindTurbine", &table(), "ds", None),
            Err(ResolveError::UnresolvableReference { .. })
        ));
    }

    #[test]
    fn destination_trailing_slash_is_ignored() {
        let resolved = resolve_reference(
            "WindTurbine",
            &table(),
            "ds/XRoot/",
            Some("MyPackage/myTurbine.json"),
        )
        .unwrap();
        assert_eq!(resolved, "dmss://ds/XRoot/MyPackage/WindTurbine");
    }

    // Every scheme resolves to an address with a valid protocol prefix.
    #[test]
    fn dispatch_is_total_over_schemes() {
        let cases = [
            "dmss://system/SIMOS/Blueprint",
            "CORE:Blueprint",
            "./Mooring",
            "/AnotherPackage/MyType",
            "Moorings/Mooring",
        ];
        for reference in cases {
            let resolved =
                resolve_reference(reference, &table(), "ds", Some("Root/Moorings/f.json")).unwrap();
            assert!(
                resolved.starts_with("dmss://") || resolved.starts_with("http://"),
                "{reference} resolved to {resolved}"
            );
        }
    }

    #[test]
    fn normalize_path_collapses_segments() {
        assert_eq!(normalize_path("Root/Moorings/../WindTurbine"), "Root/WindTurbine");
        assert_eq!(normalize_path("Root/./Moorings/Mooring"), "Root/Moorings/Mooring");
        assert_eq!(normalize_path("a/b/../../c"), "c");
        assert_eq!(normalize_path("../a"), "../a");
        assert_eq!(normalize_path("a//b"), "a/b");
    }
}
