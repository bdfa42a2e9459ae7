use bitflags::bitflags;
use indexmap::IndexMap;

use crate::model::content::Content;
use crate::model::field::FieldDesc;
use crate::model::strings::JavaString;

bitflags! {
    /// The one-byte flag field of `ClassDescInfo`, per
    /// `java.io.ObjectStreamConstants`.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct ClassDescFlags: u8 {
        const SC_WRITE_METHOD  = 0x01;
        const SC_SERIALIZABLE  = 0x02;
        const SC_EXTERNALIZABLE = 0x04;
        const SC_BLOCKDATA     = 0x08;
        const SC_ENUM          = 0x10;
    }
}

impl ClassDescFlags {
    /// Whether this flag combination is one the grammar permits (§4.3): a
    /// descriptor is fundamentally either serializable or externalizable,
    /// never both and never neither (enums are a special case layered on
    /// top of `SC_SERIALIZABLE`).
    pub fn is_valid(self) -> bool {
        let serializable = self.contains(Self::SC_SERIALIZABLE);
        let externalizable = self.contains(Self::SC_EXTERNALIZABLE);
        serializable ^ externalizable
    }
}

/// The `classDescInfo` production: flags, declared fields, the class
/// annotation list, and the (possibly absent) super descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescInfo {
    pub flags: ClassDescFlags,
    pub fields: Vec<FieldDesc>,
    pub annotation: Vec<Content>,
    /// Boxed: a descriptor's super chain recursively contains more
    /// `ClassDescInfo`s, so this needs indirection to have finite size.
    pub super_class: Option<Box<ClassDescriptor>>,
}

/// A decoded class descriptor. Immutable once constructed: the per-object
/// field values a descriptor's class produces when used by an `Object` live
/// in that `Object`'s own [`ClassData`], never here, precisely because a
/// single descriptor is shared (via the handle table) across every object
/// of that class in the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    pub name: JavaString,
    pub serial_uid: i64,
    pub info: ClassDescInfo,
}

impl ClassDescriptor {
    /// The descriptor chain from this class up through its ancestors,
    /// most-derived first.
    pub fn chain(&self) -> ClassDescChain<'_> {
        ClassDescChain { next: Some(self) }
    }
}

pub struct ClassDescChain<'a> {
    next: Option<&'a ClassDescriptor>,
}

impl<'a> Iterator for ClassDescChain<'a> {
    type Item = &'a ClassDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.info.super_class.as_deref();
        Some(current)
    }
}

/// The per-object, per-hierarchy-level contents produced by one
/// `ClassDescriptor`: declared field values in `info.fields` order, plus
/// whatever an object's (or its externalize method's) custom writer
/// appended as an annotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassData {
    pub values: IndexMap<String, crate::model::field::FieldValue>,
    pub annotation: Vec<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializable_and_externalizable_are_mutually_exclusive() {
        assert!(ClassDescFlags::SC_SERIALIZABLE.is_valid());
        assert!(ClassDescFlags::SC_EXTERNALIZABLE.is_valid());
        assert!(!(ClassDescFlags::SC_SERIALIZABLE | ClassDescFlags::SC_EXTERNALIZABLE).is_valid());
        assert!(!ClassDescFlags::empty().is_valid());
    }

    #[test]
    fn write_method_and_blockdata_dont_affect_validity_on_their_own() {
        let flags = ClassDescFlags::SC_SERIALIZABLE | ClassDescFlags::SC_WRITE_METHOD;
        assert!(flags.is_valid());
    }

    #[test]
    fn chain_walks_from_most_derived_to_root() {
        let root = ClassDescriptor {
            name: JavaString::new(b"Root".to_vec(), crate::model::strings::StringWidth::Short),
            serial_uid: 0,
            info: ClassDescInfo {
                flags: ClassDescFlags::SC_SERIALIZABLE,
                fields: vec![],
                annotation: vec![],
                super_class: None,
            },
        };
        let child = ClassDescriptor {
            name: JavaString::new(b"Child".to_vec(), crate::model::strings::StringWidth::Short),
            serial_uid: 0,
            info: ClassDescInfo {
                flags: ClassDescFlags::SC_SERIALIZABLE,
                fields: vec![],
                annotation: vec![],
                super_class: Some(Box::new(root)),
            },
        };

        let names: Vec<_> = child.chain().map(|d| d.name.to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["Child", "Root"]);
    }
}
