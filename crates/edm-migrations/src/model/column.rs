//! Column definitions carried by operations.

use chrono::{NaiveDate, NaiveDateTime};
use edm_metadata::{EdmProperty, MaxLength, PrimitiveTypeKind, StoreGeneratedPattern};
use serde::{Deserialize, Serialize};

/// Default decimal precision when none is declared.
pub const DEFAULT_DECIMAL_PRECISION: u8 = 18;
/// Default decimal scale when none is declared.
pub const DEFAULT_DECIMAL_SCALE: u8 = 2;

/// A literal column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// Decimal literal kept as text.
    Decimal(String),
    Text(String),
    Binary(Vec<u8>),
    DateTime(NaiveDateTime),
    Guid(String),
}

fn epoch_1900() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1900, 1, 1).and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// A column as seen by the SQL generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnModel {
    pub name: String,
    pub kind: PrimitiveTypeKind,
    pub nullable: bool,
    pub max_length: Option<MaxLength>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub fixed_length: Option<bool>,
    pub unicode: Option<bool>,
    pub collation: Option<String>,
    /// Store-generated on insert.
    pub identity: bool,
    /// Row-version column.
    pub timestamp: bool,
    /// Provider type overriding the default mapping.
    pub store_type: Option<String>,
    pub default_value: Option<ColumnValue>,
    /// Default expression, emitted verbatim.
    pub default_value_sql: Option<String>,
}

impl ColumnModel {
    /// A nullable column of the given kind.
    pub fn new(name: impl Into<String>, kind: PrimitiveTypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: true,
            max_length: None,
            precision: None,
            scale: None,
            fixed_length: None,
            unicode: None,
            collation: None,
            identity: false,
            timestamp: false,
            store_type: None,
            default_value: None,
            default_value_sql: None,
        }
    }

    /// Build from a store property. Returns `None` for non-primitive properties,
    /// which validated store models never contain.
    pub fn from_property(property: &EdmProperty) -> Option<Self> {
        let kind = property.primitive_kind()?;
        let facets = &property.facets;
        Some(Self {
            name: property.name.clone(),
            kind,
            nullable: property.nullable,
            max_length: facets.max_length,
            precision: facets.precision,
            scale: facets.scale,
            fixed_length: facets.fixed_length,
            unicode: facets.unicode,
            collation: facets.collation.clone(),
            identity: facets.store_generated_pattern == StoreGeneratedPattern::Identity,
            timestamp: property.is_timestamp(),
            store_type: property.store_type.clone(),
            default_value: None,
            default_value_sql: None,
        })
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_max_length(mut self, max_length: MaxLength) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn with_fixed_length(mut self, fixed_length: bool) -> Self {
        self.fixed_length = Some(fixed_length);
        self
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = Some(unicode);
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    /// Mark as a non-nullable row-version column.
    pub fn timestamp(mut self) -> Self {
        self.timestamp = true;
        self.nullable = false;
        self
    }

    pub fn with_store_type(mut self, store_type: impl Into<String>) -> Self {
        self.store_type = Some(store_type.into());
        self
    }

    pub fn with_default(mut self, value: ColumnValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_default_sql(mut self, sql: impl Into<String>) -> Self {
        self.default_value_sql = Some(sql.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
            || self
                .default_value_sql
                .as_deref()
                .is_some_and(|sql| !sql.trim().is_empty())
    }

    /// The value existing rows receive when this column is added as
    /// non-nullable without a default. `None` for types with no neutral value.
    pub fn clr_default_value(&self) -> Option<ColumnValue> {
        use PrimitiveTypeKind::*;
        match self.kind {
            Boolean => Some(ColumnValue::Boolean(false)),
            Byte | Int16 | Int32 | Int64 => Some(ColumnValue::Integer(0)),
            Single | Double => Some(ColumnValue::Float(0.0)),
            Decimal => Some(ColumnValue::Decimal("0".to_string())),
            String => Some(ColumnValue::Text(std::string::String::new())),
            Binary => Some(ColumnValue::Binary(Vec::new())),
            DateTime | DateTimeOffset => epoch_1900().map(ColumnValue::DateTime),
            Time => Some(ColumnValue::Text("00:00:00".to_string())),
            Guid => Some(ColumnValue::Guid("00000000-0000-0000-0000-000000000000".to_string())),
            Geography | Geometry => None,
        }
    }

    /// Whether this column holds less than `other`, so converting `other`
    /// into it may lose data.
    pub fn is_narrower_than(&self, other: &ColumnModel) -> bool {
        if !self.nullable && other.nullable {
            return true;
        }
        if !other.kind.widens_to(self.kind) {
            return true;
        }
        if self.kind.has_length() && other.kind.has_length() {
            let mine = self.max_length.unwrap_or(MaxLength::Max);
            let theirs = other.max_length.unwrap_or(MaxLength::Max);
            if !mine.covers(theirs) {
                return true;
            }
        }
        if self.kind == PrimitiveTypeKind::Decimal && other.kind == PrimitiveTypeKind::Decimal {
            let precision = self.precision.unwrap_or(DEFAULT_DECIMAL_PRECISION);
            let scale = self.scale.unwrap_or(DEFAULT_DECIMAL_SCALE);
            if precision < other.precision.unwrap_or(DEFAULT_DECIMAL_PRECISION)
                || scale < other.scale.unwrap_or(DEFAULT_DECIMAL_SCALE)
            {
                return true;
            }
        }
        self.kind == PrimitiveTypeKind::String
            && other.kind == PrimitiveTypeKind::String
            && self.unicode == Some(false)
            && other.unicode != Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_property_copies_facets() {
        let property = EdmProperty::required("Name", PrimitiveTypeKind::String)
            .with_max_length(MaxLength::Fixed(64))
            .with_unicode(false);
        let column = ColumnModel::from_property(&property).unwrap();

        assert_eq!(column.name, "Name");
        assert!(!column.nullable);
        assert_eq!(column.max_length, Some(MaxLength::Fixed(64)));
        assert_eq!(column.unicode, Some(false));
        assert!(!column.identity);
    }

    #[test]
    fn test_complex_properties_have_no_column() {
        assert!(ColumnModel::from_property(&EdmProperty::complex("Address", "Model.Address")).is_none());
    }

    #[test]
    fn test_narrowing() {
        let wide = ColumnModel::new("Name", PrimitiveTypeKind::String);
        let short = ColumnModel::new("Name", PrimitiveTypeKind::String).with_max_length(MaxLength::Fixed(10));
        assert!(short.is_narrower_than(&wide));
        assert!(!wide.is_narrower_than(&short));

        let required = ColumnModel::new("Name", PrimitiveTypeKind::String).not_null();
        assert!(required.is_narrower_than(&wide));
        assert!(!wide.is_narrower_than(&required));

        let int = ColumnModel::new("Count", PrimitiveTypeKind::Int32);
        let long = ColumnModel::new("Count", PrimitiveTypeKind::Int64);
        assert!(int.is_narrower_than(&long));
        assert!(!long.is_narrower_than(&int));

        let ansi = ColumnModel::new("Name", PrimitiveTypeKind::String).with_unicode(false);
        assert!(ansi.is_narrower_than(&wide));
    }

    #[test]
    fn test_clr_defaults() {
        assert_eq!(
            ColumnModel::new("Count", PrimitiveTypeKind::Int32).clr_default_value(),
            Some(ColumnValue::Integer(0))
        );
        assert_eq!(
            ColumnModel::new("Flag", PrimitiveTypeKind::Boolean).clr_default_value(),
            Some(ColumnValue::Boolean(false))
        );
        assert!(matches!(
            ColumnModel::new("At", PrimitiveTypeKind::DateTime).clr_default_value(),
            Some(ColumnValue::DateTime(dt)) if dt.to_string() == "1900-01-01 00:00:00"
        ));
        assert!(ColumnModel::new("Shape", PrimitiveTypeKind::Geometry).clr_default_value().is_none());
    }
}
