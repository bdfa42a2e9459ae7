use crate::model::class_desc::{ClassData, ClassDescriptor};

/// A decoded `TC_OBJECT`. `class_data` holds one entry per level of
/// `description`'s superclass chain, in the order the grammar reads them:
/// index `0` is the topmost ancestor actually carrying class data, the
/// last entry is `description` itself. This is the hazard called out in
/// the design notes: many objects can share one `description` via the
/// handle table, so the field values for *this* object must never be
/// written into the shared descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub description: Option<ClassDescriptor>,
    pub class_data: Vec<ClassData>,
}

impl Object {
    /// The class data belonging to `description` itself (the most-derived
    /// level), if any was read.
    pub fn own_class_data(&self) -> Option<&ClassData> {
        self.class_data.last()
    }
}
