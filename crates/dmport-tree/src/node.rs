//! In-memory package tree nodes.
//!
//! A [`Package`] mirrors one folder of the import. Its children are a
//! tagged union: sub-packages, parsed JSON entities, and raw binary
//! files all travel through upload differently, so they are distinct
//! variants rather than one duck-typed node kind.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use dmport_types::{core_types, fields, ReferenceType};

/// One child of a [`Package`].
#[derive(Clone, Debug)]
pub enum PackageEntry {
    /// A nested folder.
    Package(Package),
    /// A parsed JSON document.
    Entity(Entity),
    /// Raw binary content uploaded through the file path.
    Binary(BinaryFile),
}

impl PackageEntry {
    /// The name this entry is found under within its parent.
    pub fn name(&self) -> &str {
        match self {
            PackageEntry::Package(package) => &package.name,
            PackageEntry::Entity(entity) => &entity.name,
            PackageEntry::Binary(file) => &file.name,
        }
    }
}

/// A parsed JSON document attached to the tree.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Document id; generated when the source document lacks one.
    pub uid: String,
    /// The document's `name` field (falls back to the file stem).
    pub name: String,
    /// File name within the owning package, e.g. `Mooring.json`.
    pub file_name: String,
    /// The full document, including the (possibly generated) `_id`.
    pub content: Map<String, Value>,
}

impl Entity {
    /// Wrap a parsed document, generating an `_id` if it has none.
    pub fn from_document(file_name: &str, mut content: Map<String, Value>) -> Self {
        let uid = match content.get(fields::ID).and_then(Value::as_str) {
            Some(existing) => existing.to_string(),
            None => {
                let generated = Uuid::new_v4().to_string();
                content.insert(fields::ID.to_string(), Value::String(generated.clone()));
                generated
            }
        };
        let name = content
            .get(fields::NAME)
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(file_name).to_string());
        Self {
            uid,
            name,
            file_name: file_name.to_string(),
            content,
        }
    }
}

/// Raw binary content plus its target filename.
#[derive(Clone, Debug)]
pub struct BinaryFile {
    /// Generated id the upload and any storage references use.
    pub uid: String,
    /// File name within the owning package, e.g. `plot.pdf`.
    pub name: String,
    pub content: Vec<u8>,
}

impl BinaryFile {
    pub fn new(name: &str, content: Vec<u8>) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            name: name.to_string(),
            content,
        }
    }
}

/// A folder/namespace node of the import tree.
#[derive(Clone, Debug)]
pub struct Package {
    pub name: String,
    pub uid: String,
    /// True iff this is the top-level package of the import operation.
    pub is_root: bool,
    /// The package's `_meta_` block (dependency declarations, version).
    pub meta: Option<Map<String, Value>>,
    pub children: Vec<PackageEntry>,
}

impl Package {
    pub fn new(name: &str, is_root: bool) -> Self {
        Self {
            name: name.to_string(),
            uid: Uuid::new_v4().to_string(),
            is_root,
            meta: None,
            children: Vec::new(),
        }
    }

    /// Find a direct child sub-package by name, creating and appending it
    /// if absent. Only package children are considered; an entity or file
    /// with the same name never satisfies the lookup.
    pub fn ensure_child_package(&mut self, name: &str) -> &mut Package {
        let position = self.children.iter().position(
            |child| matches!(child, PackageEntry::Package(package) if package.name == name),
        );
        let index = match position {
            Some(index) => index,
            None => {
                self.children
                    .push(PackageEntry::Package(Package::new(name, false)));
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            PackageEntry::Package(package) => package,
            _ => unreachable!("index points at a package child"),
        }
    }

    /// Walk (and create) the chain of sub-packages named by `path`, a
    /// `mkdir -p` over the in-memory tree.
    pub fn ensure_package_path(&mut self, path: &[&str]) -> &mut Package {
        let mut current = self;
        for segment in path {
            current = current.ensure_child_package(segment);
        }
        current
    }

    /// Find a direct child of any kind by name.
    pub fn search(&self, name: &str) -> Option<&PackageEntry> {
        self.children.iter().find(|child| child.name() == name)
    }

    /// Find a direct child sub-package by name.
    pub fn search_package(&self, name: &str) -> Option<&Package> {
        self.children.iter().find_map(|child| match child {
            PackageEntry::Package(package) if package.name == name => Some(package),
            _ => None,
        })
    }

    /// The package document uploaded to the store. Children appear as
    /// storage references addressed by the ids generated during this
    /// import.
    pub fn to_document(&self) -> Map<String, Value> {
        let content: Vec<Value> = self
            .children
            .iter()
            .map(|child| {
                let uid = match child {
                    PackageEntry::Package(package) => &package.uid,
                    PackageEntry::Entity(entity) => &entity.uid,
                    PackageEntry::Binary(file) => &file.uid,
                };
                json!({
                    "address": format!("${uid}"),
                    "type": core_types::REFERENCE,
                    "referenceType": ReferenceType::Storage.as_str(),
                })
            })
            .collect();

        let mut document = Map::new();
        document.insert(fields::ID.to_string(), Value::String(self.uid.clone()));
        document.insert(
            fields::TYPE.to_string(),
            Value::String(core_types::PACKAGE.to_string()),
        );
        document.insert(fields::NAME.to_string(), Value::String(self.name.clone()));
        document.insert(fields::IS_ROOT.to_string(), Value::Bool(self.is_root));
        document.insert(
            fields::META.to_string(),
            Value::Object(self.meta.clone().unwrap_or_default()),
        );
        document.insert(fields::CONTENT.to_string(), Value::Array(content));
        document
    }
}

fn file_stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
}
