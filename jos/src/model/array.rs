use crate::model::class_desc::ClassDescriptor;
use crate::model::field::FieldValue;

/// A decoded `TC_ARRAY`: its element-class descriptor (e.g. for `[B`, a
/// descriptor named `"[B"`) and its elements in wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub description: ClassDescriptor,
    pub values: Vec<FieldValue>,
}
