//! Attribute dictionary: names, type codes, value kinds and enumerations.
//!
//! A dictionary maps between attribute names and `(vendor, code)` pairs and
//! tags each attribute with the value kind the codec uses to decode it. It
//! is built once (from the bundled resource or from dictionary files) and
//! read-only afterwards, so concurrent readers need no synchronization.

mod parser;

pub use parser::load_file;

use crate::attributes::ValueKind;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

/// Errors from dictionary registration, lookup and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictionaryError {
    /// Attribute names are unique across the whole dictionary.
    #[error("attribute name {0:?} is already registered")]
    DuplicateName(String),

    /// Type codes are unique within a vendor space.
    #[error("attribute code {code} is already registered for vendor {vendor:?}")]
    DuplicateCode { vendor: Option<u32>, code: u8 },

    /// Vendor ids are unsigned 32-bit values.
    #[error("invalid vendor id {0}")]
    InvalidVendorId(i64),

    /// Name-based lookup failed.
    #[error("unknown attribute name {0:?}")]
    UnknownAttributeName(String),

    /// A value that does not parse as its attribute's kind.
    #[error("bad attribute value: {0}")]
    BadValue(String),

    /// Dictionary file grammar violation.
    #[error("dictionary syntax error at {file}:{line}: {message}")]
    Syntax {
        file: String,
        line: usize,
        message: String,
    },

    /// I/O failure while reading a dictionary file.
    #[error("cannot read dictionary file {file}: {message}")]
    Io { file: String, message: String },
}

/// One attribute entry: name, location and value kind, plus an optional
/// enumeration of symbolic integer values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub name: String,
    pub code: u8,
    /// `None` for the standard space, `Some(id)` for vendor sub-attributes.
    pub vendor: Option<u32>,
    pub kind: ValueKind,
    values_by_number: HashMap<u32, String>,
    values_by_name: HashMap<String, u32>,
}

impl AttributeDescriptor {
    pub fn standard(name: impl Into<String>, code: u8, kind: ValueKind) -> Self {
        AttributeDescriptor {
            name: name.into(),
            code,
            vendor: None,
            kind,
            values_by_number: HashMap::new(),
            values_by_name: HashMap::new(),
        }
    }

    pub fn vendor(name: impl Into<String>, vendor: u32, code: u8, kind: ValueKind) -> Self {
        AttributeDescriptor {
            name: name.into(),
            code,
            vendor: Some(vendor),
            kind,
            values_by_number: HashMap::new(),
            values_by_name: HashMap::new(),
        }
    }

    /// Register an enumeration entry. Later registrations win, matching the
    /// way dictionary files override earlier includes.
    pub fn add_value(&mut self, name: impl Into<String>, value: u32) {
        let name = name.into();
        self.values_by_number.insert(value, name.clone());
        self.values_by_name.insert(name, value);
    }

    /// Symbolic name for an integer value, if registered.
    pub fn value_name(&self, value: u32) -> Option<&str> {
        self.values_by_number.get(&value).map(String::as_str)
    }

    /// Integer value for a symbolic name. Exact match, no case folding.
    pub fn value_by_name(&self, name: &str) -> Option<u32> {
        self.values_by_name.get(name).copied()
    }
}

/// The dictionary proper. Three lookup directions: by `(vendor, code)`, by
/// name, and vendor id to/from vendor name.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    descriptors: Vec<AttributeDescriptor>,
    by_code: HashMap<(Option<u32>, u8), usize>,
    by_name: HashMap<String, usize>,
    vendor_names: HashMap<u32, String>,
    vendor_ids: HashMap<String, u32>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    /// Descriptor for `(vendor, code)`; `None` vendor is the standard space.
    pub fn attribute_by_code(
        &self,
        vendor: Option<u32>,
        code: u8,
    ) -> Option<&AttributeDescriptor> {
        self.by_code
            .get(&(vendor, code))
            .map(|&i| &self.descriptors[i])
    }

    /// Descriptor by attribute name. Exact match.
    pub fn attribute_by_name(&self, name: &str) -> Option<&AttributeDescriptor> {
        self.by_name.get(name).map(|&i| &self.descriptors[i])
    }

    /// Like [`Dictionary::attribute_by_name`], failing with
    /// [`DictionaryError::UnknownAttributeName`].
    pub fn require_attribute(&self, name: &str) -> Result<&AttributeDescriptor, DictionaryError> {
        self.attribute_by_name(name)
            .ok_or_else(|| DictionaryError::UnknownAttributeName(name.to_string()))
    }

    pub fn vendor_name(&self, vendor_id: u32) -> Option<&str> {
        self.vendor_names.get(&vendor_id).map(String::as_str)
    }

    pub fn vendor_id(&self, name: &str) -> Option<u32> {
        self.vendor_ids.get(name).copied()
    }

    /// Declare a vendor namespace. Re-declaring the same id replaces the
    /// name mapping.
    pub fn add_vendor(
        &mut self,
        vendor_id: u32,
        name: impl Into<String>,
    ) -> Result<(), DictionaryError> {
        let name = name.into();
        self.vendor_names.insert(vendor_id, name.clone());
        self.vendor_ids.insert(name, vendor_id);
        Ok(())
    }

    /// Register an attribute descriptor. Names are unique globally, codes
    /// within their vendor space.
    pub fn add_attribute(&mut self, desc: AttributeDescriptor) -> Result<(), DictionaryError> {
        if self.by_name.contains_key(&desc.name) {
            return Err(DictionaryError::DuplicateName(desc.name));
        }
        let key = (desc.vendor, desc.code);
        if self.by_code.contains_key(&key) {
            return Err(DictionaryError::DuplicateCode {
                vendor: desc.vendor,
                code: desc.code,
            });
        }
        let index = self.descriptors.len();
        self.by_name.insert(desc.name.clone(), index);
        self.by_code.insert(key, index);
        self.descriptors.push(desc);
        Ok(())
    }

    /// Register an enumeration entry on an already-declared attribute.
    pub fn add_value(
        &mut self,
        attribute: &str,
        value_name: impl Into<String>,
        value: u32,
    ) -> Result<(), DictionaryError> {
        let index = *self
            .by_name
            .get(attribute)
            .ok_or_else(|| DictionaryError::UnknownAttributeName(attribute.to_string()))?;
        self.descriptors[index].add_value(value_name, value);
        Ok(())
    }

    /// Parse dictionary text in the FreeRADIUS-style grammar into this
    /// dictionary. `source` names the origin in syntax errors.
    pub fn parse(&mut self, text: &str, source: &str) -> Result<(), DictionaryError> {
        parser::parse_into(self, text, source, None)
    }

    /// A fresh copy of the bundled default dictionary: the RFC 2865/2866/2869
    /// standard attributes plus the Microsoft vendor space.
    pub fn bundled() -> Self {
        let mut dict = Dictionary::new();
        dict.parse(include_str!("default.dict"), "default.dict")
            .expect("bundled dictionary parses");
        dict
    }
}

static DEFAULT: LazyLock<Dictionary> = LazyLock::new(Dictionary::bundled);

/// The process-wide default dictionary, built once on first use.
pub fn default_dictionary() -> &'static Dictionary {
    &DEFAULT
}
