//! Body encoding types and the data-type resolver.
//!
//! A connector or request declares which body encodings it supports; the
//! resolver picks one in a fixed priority order and decides whether connector
//! and request body data merge field-by-field (JSON/form/multipart) or the
//! request's raw body replaces the connector's wholesale (mixed/XML).

use crate::bag::PropertyBag;
use crate::error::CourierError;
use serde_json::Value;

/// Body encoding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// `application/json` body built from a field map.
    Json,
    /// `application/x-www-form-urlencoded` body built from a field map.
    Form,
    /// `multipart/form-data` body built from a field map.
    Multipart,
    /// Raw body bytes, sent as-is.
    Mixed,
    /// Raw XML body (`application/xml`), sent as-is.
    Xml,
}

/// Resolution priority when a type declares more than one capability.
pub(crate) const PRIORITY: [DataType; 5] = [
    DataType::Json,
    DataType::Form,
    DataType::Multipart,
    DataType::Mixed,
    DataType::Xml,
];

impl DataType {
    /// Whether connector and request body data merge field-by-field.
    /// Raw types never merge; the request body fully replaces the connector's.
    pub fn supports_merging(&self) -> bool {
        !matches!(self, DataType::Mixed | DataType::Xml)
    }

    /// Default `content-type` for raw bodies. Field-map types let the sender
    /// encoder pick the header.
    pub fn default_content_type(&self) -> Option<&'static str> {
        match self {
            DataType::Mixed => Some("application/octet-stream"),
            DataType::Xml => Some("application/xml"),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::Json => "JSON",
            DataType::Form => "FORM",
            DataType::Multipart => "MULTIPART",
            DataType::Mixed => "MIXED",
            DataType::Xml => "XML",
        };
        f.write_str(name)
    }
}

/// Body container of a pending request.
///
/// Invariant: data may be present only once a `DataType` is set, and the data
/// shape must match the type (field maps for merging types, raw bytes for
/// mixed/XML). Mutations that would break the invariant fail instead of
/// silently dropping data.
#[derive(Debug, Clone, Default)]
pub struct DataBag {
    data_type: Option<DataType>,
    fields: PropertyBag<Value>,
    raw: Option<Vec<u8>>,
}

impl DataBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.raw.is_none()
    }

    /// Field map for JSON/form/multipart bodies.
    pub fn fields(&self) -> &PropertyBag<Value> {
        &self.fields
    }

    /// Raw bytes for mixed/XML bodies.
    pub fn raw(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    /// Set the resolved data type. When data already exists, the new type is
    /// re-validated against the data shape.
    pub fn set_data_type(&mut self, data_type: DataType) -> Result<(), CourierError> {
        if data_type.supports_merging() && self.raw.is_some() {
            return Err(CourierError::ConfigurationError(format!(
                "cannot switch to {data_type}: a raw body is already set"
            )));
        }
        if !data_type.supports_merging() && !self.fields.is_empty() {
            return Err(CourierError::ConfigurationError(format!(
                "cannot switch to {data_type}: body fields are already set"
            )));
        }
        self.data_type = Some(data_type);
        Ok(())
    }

    /// Insert a body field. Requires a field-map data type to be resolved.
    pub fn insert(&mut self, key: impl AsRef<str>, value: Value) -> Result<(), CourierError> {
        match self.data_type {
            Some(t) if t.supports_merging() => {
                self.fields.set(key, value);
                Ok(())
            }
            Some(t) => Err(CourierError::ConfigurationError(format!(
                "cannot set body fields on a {t} body"
            ))),
            None => Err(CourierError::UndeclaredDataType),
        }
    }

    /// Replace the raw body. Requires a raw data type to be resolved.
    pub fn set_raw(&mut self, bytes: impl Into<Vec<u8>>) -> Result<(), CourierError> {
        match self.data_type {
            Some(t) if !t.supports_merging() => {
                self.raw = Some(bytes.into());
                Ok(())
            }
            Some(t) => Err(CourierError::ConfigurationError(format!(
                "cannot set a raw body on a {t} body"
            ))),
            None => Err(CourierError::UndeclaredDataType),
        }
    }

    /// Merge another field map into this body (incoming wins per key, JSON
    /// objects merge one level deep).
    pub(crate) fn merge_fields(&mut self, incoming: &PropertyBag<Value>) {
        self.fields.merge([Some(incoming)]);
    }
}

/// Pick the first declared capability in priority order, or `None`.
pub(crate) fn first_declared(capabilities: &[DataType]) -> Option<DataType> {
    PRIORITY.iter().copied().find(|t| capabilities.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_without_type_is_rejected() {
        let mut bag = DataBag::new();
        let err = bag.insert("key", json!("value")).unwrap_err();
        assert!(matches!(err, CourierError::UndeclaredDataType));
    }

    #[test]
    fn raw_body_requires_raw_type() {
        let mut bag = DataBag::new();
        bag.set_data_type(DataType::Json).unwrap();
        assert!(bag.set_raw(b"<xml/>".to_vec()).is_err());

        let mut raw = DataBag::new();
        raw.set_data_type(DataType::Mixed).unwrap();
        raw.set_raw(b"payload".to_vec()).unwrap();
        assert_eq!(raw.raw().unwrap(), b"payload");
    }

    #[test]
    fn type_switch_revalidates_existing_data() {
        let mut bag = DataBag::new();
        bag.set_data_type(DataType::Json).unwrap();
        bag.insert("a", json!(1)).unwrap();

        // Field data survives a switch between field-map types.
        bag.set_data_type(DataType::Form).unwrap();
        assert_eq!(bag.data_type(), Some(DataType::Form));

        // But not a switch to a raw type.
        assert!(bag.set_data_type(DataType::Mixed).is_err());
    }

    #[test]
    fn priority_order_picks_json_first() {
        let caps = [DataType::Multipart, DataType::Json];
        assert_eq!(first_declared(&caps), Some(DataType::Json));
        assert_eq!(first_declared(&[]), None);
    }
}
