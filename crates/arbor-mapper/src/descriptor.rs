//! Field descriptors and the validated per-type mapping table.

use std::collections::HashSet;
use std::fmt;

use arbor_types::RefStrength;

use crate::entity::TypeInfo;
use crate::error::{MapError, MapResult};

/// What a field means to the mapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRole {
    /// Holds the node identifier.
    Identifier,
    /// Holds the node name.
    Name,
    /// Holds the absolute node path.
    Path,
    /// Stored as a node property.
    Property,
    /// Stored as a store-managed binary.
    Content,
    /// Stored as a pointer to another node.
    Reference { strength: RefStrength, lazy: bool },
    /// Stored as child nodes under a container named after the field.
    ChildNode,
}

impl FieldRole {
    /// Identity roles are always mapped, whatever the field filter says.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identifier | Self::Name | Self::Path)
    }

    /// Short name of the role, used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Name => "name",
            Self::Path => "path",
            Self::Property => "property",
            Self::Content => "content",
            Self::Reference { .. } => "reference",
            Self::ChildNode => "child node",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scalar, ordered list, or string-keyed map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cardinality {
    #[default]
    Scalar,
    List,
    Map,
}

/// Element type of a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    /// A store [`Value`](arbor_types::Value).
    Simple,
    /// A [`ContentProvider`](arbor_content::ContentProvider).
    Content,
    /// A mapped object of one of the listed concrete types.
    Entity(Vec<TypeInfo>),
}

/// Mapping metadata for one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    role: FieldRole,
    cardinality: Cardinality,
    element: Element,
}

impl FieldDescriptor {
    fn new(name: &'static str, role: FieldRole, element: Element) -> Self {
        Self {
            name,
            role,
            cardinality: Cardinality::Scalar,
            element,
        }
    }

    pub fn identifier(name: &'static str) -> Self {
        Self::new(name, FieldRole::Identifier, Element::Simple)
    }

    pub fn name(name: &'static str) -> Self {
        Self::new(name, FieldRole::Name, Element::Simple)
    }

    pub fn path(name: &'static str) -> Self {
        Self::new(name, FieldRole::Path, Element::Simple)
    }

    pub fn property(name: &'static str) -> Self {
        Self::new(name, FieldRole::Property, Element::Simple)
    }

    pub fn content(name: &'static str) -> Self {
        Self::new(name, FieldRole::Content, Element::Content)
    }

    /// A strong, eagerly loaded reference to `target`.
    pub fn reference(name: &'static str, target: TypeInfo) -> Self {
        Self::new(
            name,
            FieldRole::Reference {
                strength: RefStrength::Strong,
                lazy: false,
            },
            Element::Entity(vec![target]),
        )
    }

    /// A child object of type `target`.
    pub fn child(name: &'static str, target: TypeInfo) -> Self {
        Self::new(name, FieldRole::ChildNode, Element::Entity(vec![target]))
    }

    /// Make a reference weak.
    pub fn weak(mut self) -> Self {
        if let FieldRole::Reference { lazy, .. } = self.role {
            self.role = FieldRole::Reference {
                strength: RefStrength::Weak,
                lazy,
            };
        }
        self
    }

    /// Load a scalar reference on first access instead of eagerly.
    pub fn lazy(mut self) -> Self {
        if let FieldRole::Reference { strength, .. } = self.role {
            self.role = FieldRole::Reference {
                strength,
                lazy: true,
            };
        }
        self
    }

    /// Accept an additional concrete target type.
    pub fn or_type(mut self, target: TypeInfo) -> Self {
        if let Element::Entity(targets) = &mut self.element {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        self
    }

    pub fn list(mut self) -> Self {
        self.cardinality = Cardinality::List;
        self
    }

    pub fn map(mut self) -> Self {
        self.cardinality = Cardinality::Map;
        self
    }

    pub fn field_name(&self) -> &'static str {
        self.name
    }

    pub fn role(&self) -> FieldRole {
        self.role
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Concrete types accepted by an object-valued field.
    pub fn targets(&self) -> &[TypeInfo] {
        match &self.element {
            Element::Entity(targets) => targets,
            _ => &[],
        }
    }

    /// The accepted target type called `name`, if any.
    pub fn target_named(&self, name: &str) -> Option<TypeInfo> {
        self.targets().iter().copied().find(|t| t.name() == name)
    }

    /// Strength of a reference field.
    pub fn strength(&self) -> Option<RefStrength> {
        match self.role {
            FieldRole::Reference { strength, .. } => Some(strength),
            _ => None,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.role, FieldRole::Reference { lazy: true, .. })
    }

    /// Check this descriptor on its own. Returns the reason it is invalid.
    fn check(&self) -> Result<(), String> {
        let name = self.name;
        if name.is_empty() {
            return Err("empty field name".into());
        }
        match (self.role, &self.element) {
            (role, element) if role.is_identity() => {
                if self.cardinality != Cardinality::Scalar || *element != Element::Simple {
                    return Err(format!("{role} field {name:?} must be a scalar simple value"));
                }
            }
            (FieldRole::Property, Element::Simple) => {}
            (FieldRole::Property, _) => {
                return Err(format!("property field {name:?} must hold simple values"));
            }
            (FieldRole::Content, Element::Content) => {
                if self.cardinality != Cardinality::Scalar {
                    return Err(format!("content field {name:?} must be scalar"));
                }
            }
            (FieldRole::Content, _) => {
                return Err(format!("content field {name:?} must hold content"));
            }
            (FieldRole::Reference { .. } | FieldRole::ChildNode, Element::Entity(targets)) => {
                if targets.is_empty() {
                    return Err(format!("field {name:?} names no target type"));
                }
                if self.is_lazy() && self.cardinality != Cardinality::Scalar {
                    return Err(format!("lazy reference {name:?} must be scalar"));
                }
            }
            (role, _) => {
                return Err(format!("{role} field {name:?} must hold mapped objects"));
            }
        }
        Ok(())
    }
}

/// Validated field table of one mapped type.
#[derive(Debug)]
pub struct MappedType {
    info: TypeInfo,
    fields: Vec<FieldDescriptor>,
    identifier: Option<usize>,
    name: Option<usize>,
    path: Option<usize>,
}

impl MappedType {
    /// Describe and validate a type.
    pub fn build(info: TypeInfo) -> MapResult<Self> {
        let fields = info.describe();
        let invalid = |reason: String| MapError::Configuration {
            type_name: info.name().to_string(),
            reason,
        };

        let mut seen = HashSet::new();
        let mut identifier = None;
        let mut name = None;
        let mut path = None;
        for (index, field) in fields.iter().enumerate() {
            field.check().map_err(invalid)?;
            if !seen.insert(field.field_name()) {
                return Err(invalid(format!(
                    "duplicate field name {:?}",
                    field.field_name()
                )));
            }
            let slot = match field.role() {
                FieldRole::Identifier => &mut identifier,
                FieldRole::Name => &mut name,
                FieldRole::Path => &mut path,
                _ => continue,
            };
            if slot.replace(index).is_some() {
                return Err(invalid(format!("more than one {} field", field.role())));
            }
        }

        Ok(Self {
            info,
            fields,
            identifier,
            name,
            path,
        })
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn type_name(&self) -> &'static str {
        self.info.name()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.field_name() == name)
    }

    /// Index of the named field in [`fields`](MappedType::fields).
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.field_name() == name)
    }

    pub fn identifier_field(&self) -> Option<&FieldDescriptor> {
        self.identifier.map(|i| &self.fields[i])
    }

    pub fn name_field(&self) -> Option<&FieldDescriptor> {
        self.name.map(|i| &self.fields[i])
    }

    pub fn path_field(&self) -> Option<&FieldDescriptor> {
        self.path.map(|i| &self.fields[i])
    }

    /// Nodes of this type get the referenceable mixin.
    pub fn is_referenceable(&self) -> bool {
        self.identifier.is_some()
    }

    /// Whether writing an object of this type can lead to further objects.
    pub fn has_onward_fields(&self) -> bool {
        self.fields.iter().any(|f| {
            matches!(
                f.role(),
                FieldRole::ChildNode | FieldRole::Reference { .. }
            )
        })
    }

    /// Error for an operation that needs a role this type lacks.
    pub fn missing(&self, role: FieldRole) -> MapError {
        MapError::MissingRole {
            type_name: self.type_name().to_string(),
            role: role.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FieldValue, Fields, Mapped};

    macro_rules! described {
        ($ty:ident, $fields:expr) => {
            #[derive(Debug, Default)]
            struct $ty;

            impl Fields for $ty {
                fn get_field(&self, _field: &str) -> FieldValue {
                    FieldValue::Null
                }

                fn set_field(&mut self, _field: &str, _value: FieldValue) -> MapResult<()> {
                    Ok(())
                }
            }

            impl Mapped for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn describe() -> Vec<FieldDescriptor> {
                    $fields
                }
            }
        };
    }

    described!(Target, vec![FieldDescriptor::identifier("id")]);
    described!(
        Good,
        vec![
            FieldDescriptor::identifier("id"),
            FieldDescriptor::name("name"),
            FieldDescriptor::path("path"),
            FieldDescriptor::property("tags").list(),
            FieldDescriptor::content("data"),
            FieldDescriptor::reference("link", TypeInfo::of::<Target>()).weak(),
            FieldDescriptor::child("kids", TypeInfo::of::<Target>()).map(),
        ]
    );
    described!(
        TwoIds,
        vec![
            FieldDescriptor::identifier("id"),
            FieldDescriptor::identifier("uuid"),
        ]
    );
    described!(
        Duplicate,
        vec![
            FieldDescriptor::property("title"),
            FieldDescriptor::property("title").list(),
        ]
    );
    described!(ListName, vec![FieldDescriptor::name("name").list()]);
    described!(ListContent, vec![FieldDescriptor::content("data").list()]);
    described!(
        LazyList,
        vec![FieldDescriptor::reference("links", TypeInfo::of::<Target>())
            .lazy()
            .list()]
    );

    fn reason(err: MapError) -> String {
        match err {
            MapError::Configuration { reason, .. } => reason,
            other => panic!("expected configuration error, got {other}"),
        }
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    #[test]
    fn builders_compose() {
        let field = FieldDescriptor::reference("link", TypeInfo::of::<Target>())
            .weak()
            .lazy()
            .or_type(TypeInfo::of::<Good>())
            .or_type(TypeInfo::of::<Target>());
        assert_eq!(field.strength(), Some(RefStrength::Weak));
        assert!(field.is_lazy());
        assert_eq!(field.targets().len(), 2);
        assert_eq!(field.target_named("Good"), Some(TypeInfo::of::<Good>()));
        assert!(field.target_named("Other").is_none());
    }

    #[test]
    fn weak_is_ignored_on_non_references() {
        let field = FieldDescriptor::property("title").weak().lazy();
        assert_eq!(field.role(), FieldRole::Property);
        assert!(field.strength().is_none());
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn valid_type_builds() {
        let mapped = MappedType::build(TypeInfo::of::<Good>()).unwrap();
        assert_eq!(mapped.type_name(), "Good");
        assert_eq!(mapped.identifier_field().unwrap().field_name(), "id");
        assert_eq!(mapped.name_field().unwrap().field_name(), "name");
        assert_eq!(mapped.path_field().unwrap().field_name(), "path");
        assert!(mapped.is_referenceable());
        assert!(mapped.has_onward_fields());
        assert_eq!(mapped.field("kids").unwrap().cardinality(), Cardinality::Map);
    }

    #[test]
    fn second_identifier_is_rejected() {
        let err = MappedType::build(TypeInfo::of::<TwoIds>()).unwrap_err();
        assert_eq!(reason(err), "more than one identifier field");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = MappedType::build(TypeInfo::of::<Duplicate>()).unwrap_err();
        assert!(reason(err).contains("duplicate field name"));
    }

    #[test]
    fn identity_roles_must_be_scalar() {
        let err = MappedType::build(TypeInfo::of::<ListName>()).unwrap_err();
        assert!(reason(err).contains("must be a scalar simple value"));
    }

    #[test]
    fn content_must_be_scalar() {
        let err = MappedType::build(TypeInfo::of::<ListContent>()).unwrap_err();
        assert!(reason(err).contains("must be scalar"));
    }

    #[test]
    fn lazy_lists_are_rejected() {
        let err = MappedType::build(TypeInfo::of::<LazyList>()).unwrap_err();
        assert!(reason(err).contains("lazy reference"));
    }

    #[test]
    fn missing_role_names_the_role() {
        let mapped = MappedType::build(TypeInfo::of::<Target>()).unwrap();
        assert!(mapped.name_field().is_none());
        assert!(!mapped.has_onward_fields());
        let err = mapped.missing(FieldRole::Name);
        assert_eq!(err.to_string(), "Target declares no name field");
    }
}
