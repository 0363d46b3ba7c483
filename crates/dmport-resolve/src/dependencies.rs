//! Dependency table construction.
//!
//! Each file in a package may declare dependencies under
//! `_meta_.dependencies`. As the tree builder walks the package, every
//! file's declarations are folded into one package-scoped table with
//! [`merge_dependencies`]. Redeclaring an alias is fine as long as the
//! declaration is identical (packages routinely inherit and repeat their
//! parent's aliases); a conflicting redeclaration aborts the import.

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::Value;

use dmport_types::fields;
use dmport_types::{Dependency, DependencyProtocol};

use crate::error::{ResolveError, ResolveResult};

/// Alias → dependency declaration, scoped to one import operation.
pub type DependencyTable = HashMap<String, Dependency>;

/// Parse one raw `_meta_.dependencies` entry.
///
/// `context` names the file the declaration came from and is used in
/// diagnostics only.
pub fn parse_dependency(raw: &Value, context: &str) -> ResolveResult<Dependency> {
    // Screen the protocol by hand so an unsupported value reports as an
    // invalid protocol rather than a generic parse failure.
    if let Some(protocol) = raw.get("protocol").and_then(Value::as_str) {
        DependencyProtocol::from_str(protocol).map_err(|_| ResolveError::InvalidProtocol {
            protocol: protocol.to_string(),
            context: context.to_string(),
        })?;
    }
    serde_json::from_value(raw.clone()).map_err(|source| ResolveError::MalformedDependency {
        context: context.to_string(),
        source,
    })
}

/// Merge `new_declarations` into `existing`, screening for conflicts.
///
/// Identical redeclarations are accepted silently; aliases present in both
/// sets with non-identical declarations raise
/// [`ResolveError::ConflictingDependency`] naming `context`. Otherwise the
/// new declarations overwrite the existing entries (last writer wins after
/// conflict screening).
///
/// The merge has no side effects beyond its return value and may be called
/// once per file as the tree builder descends.
pub fn merge_dependencies(
    new_declarations: &[Value],
    existing: DependencyTable,
    context: &str,
) -> ResolveResult<DependencyTable> {
    let mut incoming: DependencyTable = HashMap::with_capacity(new_declarations.len());
    for raw in new_declarations {
        let dependency = parse_dependency(raw, context)?;
        incoming.insert(dependency.alias.clone(), dependency);
    }

    let mut conflicting: Vec<String> = Vec::new();
    for (alias, dependency) in &incoming {
        if let Some(old) = existing.get(alias) {
            if old != dependency {
                conflicting.push(alias.clone());
            }
        }
    }
    if !conflicting.is_empty() {
        conflicting.sort();
        return Err(ResolveError::ConflictingDependency {
            context: context.to_string(),
            aliases: conflicting,
        });
    }

    let mut merged = existing;
    merged.extend(incoming);
    Ok(merged)
}

/// The raw (pre-resolution) dependency declarations of a document, if any.
pub fn meta_dependencies(document: &serde_json::Map<String, Value>) -> &[Value] {
    document
        .get(fields::META)
        .and_then(|meta| meta.get(fields::DEPENDENCIES))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn core_declaration() -> Value {
        json!({
            "type": "CORE:Dependency",
            "alias": "CORE",
            "address": "system/SIMOS",
            "version": "0.0.1",
            "protocol": "dmss"
        })
    }

    #[test]
    fn merge_into_empty_table() {
        let table = merge_dependencies(&[core_declaration()], HashMap::new(), "a.json").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["CORE"].address, "system/SIMOS");
        assert_eq!(table["CORE"].protocol, DependencyProtocol::Dmss);
    }

    #[test]
    fn identical_redeclaration_is_accepted() {
        let first = merge_dependencies(&[core_declaration()], HashMap::new(), "a.json").unwrap();
        let second = merge_dependencies(&[core_declaration()], first.clone(), "b.json").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn redeclaration_differing_only_in_kind_is_accepted() {
        let mut untyped = core_declaration();
        untyped.as_object_mut().unwrap().remove("type");
        let first = merge_dependencies(&[core_declaration()], HashMap::new(), "a.json").unwrap();
        let merged = merge_dependencies(&[untyped], first, "b.json").unwrap();
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn conflicting_address_is_rejected() {
        let mut other = core_declaration();
        other["address"] = json!("system/other");
        let first = merge_dependencies(&[core_declaration()], HashMap::new(), "a.json").unwrap();
        let err = merge_dependencies(&[other], first, "b.json").unwrap_err();
        match err {
            ResolveError::ConflictingDependency { context, aliases } => {
                assert_eq!(context, "b.json");
                assert_eq!(aliases, vec!["CORE".to_string()]);
            }
            other => panic!("expected ConflictingDependency, got {other:?}"),
        }
    }

    #[test]
    fn conflicting_version_is_rejected() {
        let mut upgraded = core_declaration();
        upgraded["version"] = json!("3.2.1");
        let first = merge_dependencies(&[core_declaration()], HashMap::new(), "a.json").unwrap();
        assert!(matches!(
            merge_dependencies(&[upgraded], first, "b.json"),
            Err(ResolveError::ConflictingDependency { .. })
        ));
    }

    #[test]
    fn new_alias_is_added_alongside_existing() {
        let sintef = json!({
            "alias": "SINTEF",
            "address": "marine-models.sintef.com/Signals",
            "version": "1.2.3",
            "protocol": "http"
        });
        let first = merge_dependencies(&[core_declaration()], HashMap::new(), "a.json").unwrap();
        let merged = merge_dependencies(&[sintef], first, "b.json").unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["SINTEF"].protocol, DependencyProtocol::Http);
    }

    #[test]
    fn unsupported_protocol_is_rejected() {
        let mut declaration = core_declaration();
        declaration["protocol"] = json!("ftp");
        let err = merge_dependencies(&[declaration], HashMap::new(), "a.json").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidProtocol { protocol, .. } if protocol == "ftp"));
    }

    #[test]
    fn empty_protocol_is_rejected() {
        let mut declaration = core_declaration();
        declaration["protocol"] = json!("");
        assert!(matches!(
            merge_dependencies(&[declaration], HashMap::new(), "a.json"),
            Err(ResolveError::InvalidProtocol { .. })
        ));
    }

    #[test]
    fn declaration_missing_alias_is_malformed() {
        let declaration = json!({"address": "system/SIMOS", "protocol": "dmss"});
        assert!(matches!(
            merge_dependencies(&[declaration], HashMap::new(), "a.json"),
            Err(ResolveError::MalformedDependency { .. })
        ));
    }

    #[test]
    fn meta_dependencies_reads_declarations() {
        let document = json!({
            "name": "x",
            "_meta_": {"dependencies": [core_declaration()]}
        });
        let declarations = meta_dependencies(document.as_object().unwrap());
        assert_eq!(declarations.len(), 1);
    }

    #[test]
    fn meta_dependencies_defaults_to_empty() {
        let document = json!({"name": "x"});
        assert!(meta_dependencies(document.as_object().unwrap()).is_empty());
        let no_list = json!({"name": "x", "_meta_": {"version": "1"}});
        assert!(meta_dependencies(no_list.as_object().unwrap()).is_empty());
    }

    fn arbitrary_declaration() -> impl Strategy<Value = Value> {
        (
            prop::sample::select(vec!["CORE", "SINTEF", "EXT", "LOCAL"]),
            prop::sample::select(vec!["system/SIMOS", "models.example.com", "a/b/c"]),
            prop::sample::select(vec!["", "0.0.1", "1.2.3"]),
            prop::bool::ANY,
        )
            .prop_map(|(alias, address, version, dmss)| {
                json!({
                    "alias": alias,
                    "address": address,
                    "version": version,
                    "protocol": if dmss { "dmss" } else { "http" },
                })
            })
    }

    proptest! {
        // Re-merging a list that already merged cleanly never raises and
        // never changes the table.
        #[test]
        fn merge_is_idempotent(declarations in prop::collection::vec(arbitrary_declaration(), 0..8)) {
            if let Ok(once) = merge_dependencies(&declarations, HashMap::new(), "f") {
                let twice = merge_dependencies(&declarations, once.clone(), "f").unwrap();
                prop_assert_eq!(once, twice);
            }
        }
    }
}
