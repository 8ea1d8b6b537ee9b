//! Mapped types shared by the unit tests.

use std::collections::BTreeMap;

use arbor_content::ContentProvider;

use crate::descriptor::FieldDescriptor;
use crate::entity::{EntityRef, FieldValue, Fields, LazyRef, Mapped, TypeInfo};
use crate::error::{MapError, MapResult};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Folder: every field role
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct Folder {
    pub id: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub title: Option<String>,
    pub size: Option<i64>,
    pub tags: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub data: Option<ContentProvider>,
    pub children: Vec<EntityRef>,
    pub sections: BTreeMap<String, Option<EntityRef>>,
}

impl Fields for Folder {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "id" => FieldValue::scalar(&self.id),
            "name" => FieldValue::scalar(&self.name),
            "path" => FieldValue::scalar(&self.path),
            "title" => FieldValue::scalar(&self.title),
            "size" => FieldValue::scalar(&self.size),
            "tags" => FieldValue::list(&self.tags),
            "labels" => FieldValue::value_map(&self.labels),
            "data" => FieldValue::content(&self.data),
            "children" => FieldValue::objects(&self.children),
            "sections" => FieldValue::object_map(&self.sections),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "id" => self.id = value.into_scalar()?,
            "name" => self.name = value.into_scalar()?,
            "path" => self.path = value.into_scalar()?,
            "title" => self.title = value.into_scalar()?,
            "size" => self.size = value.into_scalar()?,
            "tags" => self.tags = value.into_list()?,
            "labels" => self.labels = value.into_value_map()?,
            "data" => self.data = value.into_content()?,
            "children" => self.children = value.into_objects()?,
            "sections" => self.sections = value.into_object_map()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for Folder {
    const TYPE_NAME: &'static str = "Folder";

    fn describe() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::identifier("id"),
            FieldDescriptor::name("name"),
            FieldDescriptor::path("path"),
            FieldDescriptor::property("title"),
            FieldDescriptor::property("size"),
            FieldDescriptor::property("tags").list(),
            FieldDescriptor::property("labels").map(),
            FieldDescriptor::content("data"),
            FieldDescriptor::child("children", TypeInfo::of::<Folder>()).list(),
            FieldDescriptor::child("sections", TypeInfo::of::<Folder>()).map(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Reference scenario: B is the target, A1 holds it weakly, A2 holds a
// strong list, A3 holds it strongly, Container keys strong references.
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct B {
    pub id: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub body: Option<String>,
}

impl Fields for B {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "id" => FieldValue::scalar(&self.id),
            "name" => FieldValue::scalar(&self.name),
            "path" => FieldValue::scalar(&self.path),
            "body" => FieldValue::scalar(&self.body),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "id" => self.id = value.into_scalar()?,
            "name" => self.name = value.into_scalar()?,
            "path" => self.path = value.into_scalar()?,
            "body" => self.body = value.into_scalar()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for B {
    const TYPE_NAME: &'static str = "B";

    fn describe() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::identifier("id"),
            FieldDescriptor::name("name"),
            FieldDescriptor::path("path"),
            FieldDescriptor::property("body"),
        ]
    }
}

/// A holder with one scalar reference to a `B`.
macro_rules! holder {
    ($ty:ident, $descriptor:expr) => {
        #[derive(Clone, Debug, Default)]
        pub struct $ty {
            pub name: Option<String>,
            pub b: Option<EntityRef>,
        }

        impl Fields for $ty {
            fn get_field(&self, field: &str) -> FieldValue {
                match field {
                    "name" => FieldValue::scalar(&self.name),
                    "b" => FieldValue::object(&self.b),
                    _ => FieldValue::Null,
                }
            }

            fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
                match field {
                    "name" => self.name = value.into_scalar()?,
                    "b" => self.b = value.into_object()?,
                    _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
                }
                Ok(())
            }
        }

        impl Mapped for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);

            fn describe() -> Vec<FieldDescriptor> {
                vec![FieldDescriptor::name("name"), $descriptor]
            }
        }
    };
}

holder!(
    A1,
    FieldDescriptor::reference("b", TypeInfo::of::<B>()).weak()
);
holder!(A3, FieldDescriptor::reference("b", TypeInfo::of::<B>()));

#[derive(Clone, Debug, Default)]
pub struct A2 {
    pub name: Option<String>,
    pub bs: Vec<EntityRef>,
}

impl Fields for A2 {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "name" => FieldValue::scalar(&self.name),
            "bs" => FieldValue::objects(&self.bs),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "name" => self.name = value.into_scalar()?,
            "bs" => self.bs = value.into_objects()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for A2 {
    const TYPE_NAME: &'static str = "A2";

    fn describe() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::name("name"),
            FieldDescriptor::reference("bs", TypeInfo::of::<B>()).list(),
        ]
    }
}

#[derive(Clone, Debug, Default)]
pub struct Container {
    pub name: Option<String>,
    pub refs: BTreeMap<String, Option<EntityRef>>,
}

impl Fields for Container {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "name" => FieldValue::scalar(&self.name),
            "refs" => FieldValue::object_map(&self.refs),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "name" => self.name = value.into_scalar()?,
            "refs" => self.refs = value.into_object_map()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for Container {
    const TYPE_NAME: &'static str = "Container";

    fn describe() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::name("name"),
            FieldDescriptor::reference("refs", TypeInfo::of::<B>()).map(),
        ]
    }
}

/// Weak list and weak map references to `B`.
#[derive(Clone, Debug, Default)]
pub struct Shelf {
    pub name: Option<String>,
    pub bs: Vec<EntityRef>,
    pub slots: BTreeMap<String, Option<EntityRef>>,
}

impl Fields for Shelf {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "name" => FieldValue::scalar(&self.name),
            "bs" => FieldValue::objects(&self.bs),
            "slots" => FieldValue::object_map(&self.slots),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "name" => self.name = value.into_scalar()?,
            "bs" => self.bs = value.into_objects()?,
            "slots" => self.slots = value.into_object_map()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for Shelf {
    const TYPE_NAME: &'static str = "Shelf";

    fn describe() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::name("name"),
            FieldDescriptor::reference("bs", TypeInfo::of::<B>()).weak().list(),
            FieldDescriptor::reference("slots", TypeInfo::of::<B>()).weak().map(),
        ]
    }
}

/// Holds a lazily loaded weak reference.
#[derive(Clone, Debug, Default)]
pub struct Bookmark {
    pub name: Option<String>,
    pub target: Option<LazyRef>,
}

impl Fields for Bookmark {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "name" => FieldValue::scalar(&self.name),
            "target" => FieldValue::lazy(&self.target),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "name" => self.name = value.into_scalar()?,
            "target" => self.target = value.into_lazy()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for Bookmark {
    const TYPE_NAME: &'static str = "Bookmark";

    fn describe() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::name("name"),
            FieldDescriptor::reference("target", TypeInfo::of::<B>())
                .weak()
                .lazy(),
        ]
    }
}

/// Self-referencing type with onward fields.
#[derive(Clone, Debug, Default)]
pub struct Person {
    pub id: Option<String>,
    pub name: Option<String>,
    pub friend: Option<EntityRef>,
}

impl Fields for Person {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "id" => FieldValue::scalar(&self.id),
            "name" => FieldValue::scalar(&self.name),
            "friend" => FieldValue::object(&self.friend),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "id" => self.id = value.into_scalar()?,
            "name" => self.name = value.into_scalar()?,
            "friend" => self.friend = value.into_object()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for Person {
    const TYPE_NAME: &'static str = "Person";

    fn describe() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::identifier("id"),
            FieldDescriptor::name("name"),
            FieldDescriptor::reference("friend", TypeInfo::of::<Person>()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Shapes: polymorphic child nodes
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct Rectangle {
    pub width: Option<i64>,
    pub height: Option<i64>,
}

impl Fields for Rectangle {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "width" => FieldValue::scalar(&self.width),
            "height" => FieldValue::scalar(&self.height),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "width" => self.width = value.into_scalar()?,
            "height" => self.height = value.into_scalar()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for Rectangle {
    const TYPE_NAME: &'static str = "Rectangle";

    fn describe() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::property("width"),
            FieldDescriptor::property("height"),
        ]
    }
}

#[derive(Clone, Debug, Default)]
pub struct Square {
    pub side: Option<i64>,
}

impl Fields for Square {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "side" => FieldValue::scalar(&self.side),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "side" => self.side = value.into_scalar()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for Square {
    const TYPE_NAME: &'static str = "Square";

    fn describe() -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::property("side")]
    }
}

#[derive(Clone, Debug, Default)]
pub struct Canvas {
    pub name: Option<String>,
    pub shape: Option<EntityRef>,
}

impl Fields for Canvas {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "name" => FieldValue::scalar(&self.name),
            "shape" => FieldValue::object(&self.shape),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "name" => self.name = value.into_scalar()?,
            "shape" => self.shape = value.into_object()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for Canvas {
    const TYPE_NAME: &'static str = "Canvas";

    fn describe() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::name("name"),
            FieldDescriptor::child("shape", TypeInfo::of::<Rectangle>())
                .or_type(TypeInfo::of::<Square>()),
        ]
    }
}

/// References a type that has no identifier field.
#[derive(Clone, Debug, Default)]
pub struct Sketch {
    pub name: Option<String>,
    pub outline: Option<EntityRef>,
}

impl Fields for Sketch {
    fn get_field(&self, field: &str) -> FieldValue {
        match field {
            "name" => FieldValue::scalar(&self.name),
            "outline" => FieldValue::object(&self.outline),
            _ => FieldValue::Null,
        }
    }

    fn set_field(&mut self, field: &str, value: FieldValue) -> MapResult<()> {
        match field {
            "name" => self.name = value.into_scalar()?,
            "outline" => self.outline = value.into_object()?,
            _ => return Err(MapError::unknown_field(Self::TYPE_NAME, field)),
        }
        Ok(())
    }
}

impl Mapped for Sketch {
    const TYPE_NAME: &'static str = "Sketch";

    fn describe() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::name("name"),
            FieldDescriptor::reference("outline", TypeInfo::of::<Rectangle>()),
        ]
    }
}
