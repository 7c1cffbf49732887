use std::fmt::{Display, Formatter};

/// Whether the rows of a vector may be null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Nullability {
    /// Every row holds a value.
    NonNullable,
    /// Rows may be null. Vectors created by writers are always nullable.
    #[default]
    Nullable,
}

impl Nullability {
    /// Whether this is [`Nullability::Nullable`].
    pub fn is_nullable(&self) -> bool {
        matches!(self, Nullability::Nullable)
    }
}

impl From<bool> for Nullability {
    fn from(value: bool) -> Self {
        if value {
            Self::Nullable
        } else {
            Self::NonNullable
        }
    }
}

impl Display for Nullability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonNullable => write!(f, ""),
            Self::Nullable => write!(f, "?"),
        }
    }
}
