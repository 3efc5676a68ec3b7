//! Schema type to target type token mapping

use registry::SchemaRegistry;
use schema::{ParamDef, ScalarType, TypeKind};
use thiserror::Error;
use types::{TargetLanguageProfile, TypeKey};

/// Deepest list nesting followed before the mapping is reported as cyclic.
const MAX_DEPTH: usize = 16;

/// Errors raised while mapping a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The type name is not registered
    #[error("unresolved type `{0}`")]
    UnresolvedType(String),

    /// List items refer back to the list
    #[error("type `{0}` nests itself")]
    Cycle(String),
}

/// Maps schema types to the type tokens of one target.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    registry: &'a SchemaRegistry,
    profile: &'a TargetLanguageProfile,
}

fn scalar_key(scalar: ScalarType) -> TypeKey {
    match scalar {
        ScalarType::String => TypeKey::String,
        ScalarType::Integer => TypeKey::Integer,
        ScalarType::Number => TypeKey::Number,
        ScalarType::Boolean => TypeKey::Boolean,
        ScalarType::Any => TypeKey::Any,
    }
}

impl<'a> TypeMapper<'a> {
    /// Create a mapper over `registry` for the profile's target.
    pub fn new(registry: &'a SchemaRegistry, profile: &'a TargetLanguageProfile) -> Self {
        Self { registry, profile }
    }

    /// The profile this mapper renders for.
    pub fn profile(&self) -> &TargetLanguageProfile { self.profile }

    /// Token for the scalar kind.
    pub fn map_scalar(&self, scalar: ScalarType) -> &'static str {
        self.profile.types.token(scalar_key(scalar))
    }

    /// Token for the named type.
    ///
    /// Enums and composite contracts map to their base scalar, records to the
    /// target's record token, and lists to the list form of their item token.
    pub fn map_type_ref(&self, type_name: &str) -> Result<String, MappingError> {
        self.map_at(type_name, 0)
    }

    /// Token for the type of a parameter, wrapped as optional when not required.
    pub fn map_param(&self, param: &ParamDef) -> Result<String, MappingError> {
        let inner = self.map_type_ref(&param.type_ref)?;
        Ok(if param.required { inner } else { self.profile.types.optional(&inner) })
    }

    /// Token for an optional return type; `None` maps to `None` (no return value).
    pub fn map_return(&self, type_name: Option<&str>) -> Result<Option<String>, MappingError> {
        type_name.map(|t| self.map_type_ref(t)).transpose()
    }

    fn map_at(&self, type_name: &str, depth: usize) -> Result<String, MappingError> {
        if depth > MAX_DEPTH {
            return Err(MappingError::Cycle(type_name.to_string()));
        }
        let def = self
            .registry
            .get(type_name)
            .ok_or_else(|| MappingError::UnresolvedType(type_name.to_string()))?;

        let token = match &def.kind {
            TypeKind::Scalar { scalar } => self.map_scalar(*scalar).to_string(),
            TypeKind::CompositeContract { base, .. } => self.map_scalar(*base).to_string(),
            TypeKind::Enum { .. } => self.map_scalar(ScalarType::String).to_string(),
            TypeKind::Record { .. } => self.profile.types.token(TypeKey::Record).to_string(),
            TypeKind::List { item } => {
                let item = self.map_at(item, depth + 1)?;
                self.profile.types.list_of(&item)
            }
        };
        Ok(token)
    }
}
