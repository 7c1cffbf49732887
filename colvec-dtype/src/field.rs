//! Field descriptors: a named, typed node of a vector tree.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use colvec_error::{ColvecResult, colvec_bail};
use itertools::Itertools;

use crate::{DType, FieldName, Nullability};

/// The name of the single child of list-like vectors.
pub const DATA_VECTOR_NAME: &str = "$data$";
/// The name of the entries struct of a map vector.
pub const MAP_ENTRIES_NAME: &str = "entries";
/// The name of the key field of a map entry.
pub const MAP_KEY_NAME: &str = "key";
/// The name of the value field of a map entry.
pub const MAP_VALUE_NAME: &str = "value";

/// Describes one vector: its name, type, nullability and the fields of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: FieldName,
    dtype: DType,
    nullability: Nullability,
    children: Arc<[Field]>,
}

impl Field {
    /// A field without children.
    pub fn new(name: impl Into<FieldName>, dtype: DType, nullability: Nullability) -> Self {
        Self {
            name: name.into(),
            dtype,
            nullability,
            children: Arc::new([]),
        }
    }

    /// A nullable field without children.
    pub fn nullable(name: impl Into<FieldName>, dtype: DType) -> Self {
        Self::new(name, dtype, Nullability::Nullable)
    }

    /// A non-nullable field without children.
    pub fn not_null(name: impl Into<FieldName>, dtype: DType) -> Self {
        Self::new(name, dtype, Nullability::NonNullable)
    }

    /// Replace the children of this field.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Field>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    /// A list-like field whose element field is named [`DATA_VECTOR_NAME`].
    pub fn list_of(name: impl Into<FieldName>, dtype: DType, element: Field) -> Self {
        Self::nullable(name, dtype).with_children([element.renamed(DATA_VECTOR_NAME)])
    }

    /// A map field with the canonical `entries: struct<key, value>` layout.
    pub fn map_of(name: impl Into<FieldName>, keys_sorted: bool, key: Field, value: Field) -> Self {
        let entries = Field::not_null(MAP_ENTRIES_NAME, DType::Struct).with_children([
            key.renamed(MAP_KEY_NAME),
            value.renamed(MAP_VALUE_NAME),
        ]);
        Self::nullable(name, DType::Map { keys_sorted }).with_children([entries])
    }

    /// The same field under another name.
    pub fn renamed(mut self, name: impl Into<FieldName>) -> Self {
        self.name = name.into();
        self
    }

    /// The field name.
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// The logical type of the vector.
    pub fn dtype(&self) -> &DType {
        &self.dtype
    }

    /// Whether rows may be null.
    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    /// Shorthand for `self.nullability().is_nullable()`.
    pub fn is_nullable(&self) -> bool {
        self.nullability.is_nullable()
    }

    /// The child fields, in order.
    pub fn children(&self) -> &[Field] {
        &self.children
    }

    /// Find a child field by name.
    pub fn child(&self, name: &str) -> Option<&Field> {
        self.children.iter().find(|c| c.name.as_ref() == name)
    }

    /// Check that the number and shape of the children fit the type.
    pub fn validate(&self) -> ColvecResult<()> {
        match &self.dtype {
            dtype if dtype.is_list() => {
                if self.children.len() != 1 {
                    colvec_bail!(
                        "{} field {} must have exactly one child, found {}",
                        dtype,
                        self.name,
                        self.children.len()
                    );
                }
            }
            DType::Map { .. } => {
                let entries_ok = self.children.len() == 1
                    && self.children[0].dtype == DType::Struct
                    && self.children[0].children.len() == 2;
                if !entries_ok {
                    colvec_bail!(
                        "map field {} must have a single struct child with a key and a value",
                        self.name
                    );
                }
            }
            DType::Struct | DType::Union => {}
            dtype => {
                if !self.children.is_empty() {
                    colvec_bail!("{} field {} cannot have children", dtype, self.name);
                }
            }
        }
        self.children.iter().try_for_each(|child| {
            child
                .validate()
                .map_err(|err| err.with_context(format!("in field {}", self.name)))
        })
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}{}", self.name, self.dtype, self.nullability)?;
        if !self.children.is_empty() {
            write!(f, "<{}>", self.children.iter().format(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use colvec_error::ColvecError;

    use super::*;
    use crate::PType;

    #[test]
    fn display_nested() {
        let field = Field::list_of(
            "scores",
            DType::FixedSizeList(3),
            Field::nullable("item", PType::I32.into()),
        );
        assert_eq!(
            field.to_string(),
            "scores: fixed_size_list[3]?<$data$: i32?>"
        );
        assert_eq!(
            field.child(DATA_VECTOR_NAME).map(Field::dtype),
            Some(&DType::Primitive(PType::I32))
        );
    }

    #[test]
    fn map_layout_validates() {
        let map = Field::map_of(
            "m",
            true,
            Field::not_null("k", DType::Utf8),
            Field::nullable("v", PType::F64.into()),
        );
        map.validate().unwrap();
        let entries = &map.children()[0];
        assert_eq!(entries.name().as_ref(), MAP_ENTRIES_NAME);
        assert!(!entries.is_nullable());
        assert!(entries.child(MAP_KEY_NAME).is_some());
        assert!(entries.child(MAP_VALUE_NAME).is_some());
    }

    #[test]
    fn rejects_bad_children() {
        assert!(Field::nullable("l", DType::List).validate().is_err());
        let scalar_with_child = Field::nullable("x", DType::Utf8)
            .with_children([Field::nullable("y", DType::Bool)]);
        assert!(scalar_with_child.validate().is_err());
        let bad_map = Field::nullable("m", DType::Map { keys_sorted: false })
            .with_children([Field::nullable("entries", DType::Struct)]);
        assert!(bad_map.validate().is_err());
    }

    #[test]
    fn nested_errors_name_their_path() {
        let outer = Field::nullable("outer", DType::Struct)
            .with_children([Field::nullable("l", DType::List)]);
        let root = Field::nullable("root", DType::Struct).with_children([outer]);
        let err = root.validate().unwrap_err();
        assert!(matches!(err.root(), ColvecError::InvalidArgument(..)));
        assert!(
            err.to_string()
                .starts_with("in field root: in field outer: list field l must have")
        );
    }
}
