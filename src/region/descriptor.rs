//! Object type metadata: size, pointer-prefix length, and the pointer bitmap.

use crate::util::constants::*;
use crate::util::conversions::raw_align_up;

/// Index of a registered [`TypeDescriptor`] in a [`TypeRegistry`].
///
/// Object headers store this index rather than a descriptor address, so the
/// header encoding holds on hosts with full 64-bit address spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

/// Immutable metadata describing one object type. Descriptors live for the
/// whole process; nothing mutates them after registration.
#[derive(Debug)]
pub struct TypeDescriptor {
    size: usize,
    ptr_bytes: usize,
    gcdata: Box<[u8]>,
}

impl TypeDescriptor {
    fn new(size: usize, ptr_bytes: usize, gcdata: Vec<u8>) -> Self {
        assert!(
            ptr_bytes <= size,
            "pointer prefix ({}) larger than the object ({})",
            ptr_bytes,
            size
        );
        assert!(
            gcdata.len() % BYTES_IN_WORD == 0,
            "pointer bitmap must be rounded to the word size"
        );
        let size = raw_align_up(size, BYTES_IN_WORD);
        let ptr_bytes = raw_align_up(ptr_bytes, BYTES_IN_WORD);
        if ptr_bytes != 0 {
            // One bitmap bit covers one payload word.
            assert!(
                gcdata.len() * BITS_IN_BYTE * BYTES_IN_WORD >= ptr_bytes,
                "pointer bitmap too short for the pointer prefix"
            );
        }
        TypeDescriptor {
            size,
            ptr_bytes,
            gcdata: gcdata.into_boxed_slice(),
        }
    }

    /// Object size in bytes, rounded up to the word size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Length in bytes of the pointer prefix: pointers may exist only within
    /// the first `ptr_bytes` bytes of the payload.
    pub fn ptr_bytes(&self) -> usize {
        self.ptr_bytes
    }

    /// The 64 pointer bits starting at the given bitmap byte offset.
    pub(crate) fn gcdata_word(&self, offset: usize) -> u64 {
        u64::from_le_bytes(self.gcdata[offset..offset + BYTES_IN_WORD].try_into().unwrap())
    }
}

/// The process-wide table of type descriptors.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
}

impl TypeRegistry {
    /// Register a type. `ptr_bytes` must not exceed `size`, and `gcdata`
    /// must be a whole number of words covering the pointer prefix; both are
    /// fatal to get wrong.
    pub fn register(&mut self, size: usize, ptr_bytes: usize, gcdata: Vec<u8>) -> TypeId {
        let id = u32::try_from(self.types.len()).expect("type registry overflow");
        self.types.push(TypeDescriptor::new(size, ptr_bytes, gcdata));
        TypeId(id)
    }

    pub fn get(&self, id: TypeId) -> &TypeDescriptor {
        &self.types[id.0 as usize]
    }
}

/// The header word preceding every payload: the low 32 bits hold the
/// object's [`TypeId`], the high 32 bits its payload size in words.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ObjectHeader(u64);

impl ObjectHeader {
    pub(crate) fn new(ty: TypeId, size: usize) -> Self {
        ObjectHeader(ty.0 as u64 | ((size >> LOG_MIN_OBJECT_ALIGN) as u64) << 32)
    }

    pub(crate) fn from_raw(raw: u64) -> Self {
        ObjectHeader(raw)
    }

    pub(crate) fn to_raw(self) -> u64 {
        self.0
    }

    pub(crate) fn type_id(self) -> TypeId {
        TypeId(self.0 as u32)
    }

    /// Payload size in bytes.
    pub(crate) fn size(self) -> usize {
        ((self.0 >> 32) as usize) << LOG_MIN_OBJECT_ALIGN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_word_size() {
        let mut registry = TypeRegistry::default();
        let id = registry.register(12, 4, vec![1, 0, 0, 0, 0, 0, 0, 0]);
        let ty = registry.get(id);
        assert_eq!(ty.size(), 16);
        assert_eq!(ty.ptr_bytes(), 8);
    }

    #[test]
    fn pointer_free_type() {
        let mut registry = TypeRegistry::default();
        let id = registry.register(64, 0, vec![]);
        assert_eq!(registry.get(id).ptr_bytes(), 0);
    }

    #[test]
    #[should_panic(expected = "pointer prefix")]
    fn rejects_oversized_prefix() {
        TypeRegistry::default().register(8, 16, vec![0; 8]);
    }

    #[test]
    #[should_panic(expected = "rounded to the word size")]
    fn rejects_misaligned_bitmap() {
        TypeRegistry::default().register(64, 64, vec![0xff]);
    }

    #[test]
    #[should_panic(expected = "too short")]
    fn rejects_short_bitmap() {
        TypeRegistry::default().register(1024, 1024, vec![0; 8]);
    }

    #[test]
    fn header_round_trip() {
        let mut registry = TypeRegistry::default();
        let id = registry.register(2048, 0, vec![]);
        let header = ObjectHeader::new(id, 2048);
        let decoded = ObjectHeader::from_raw(header.to_raw());
        assert_eq!(decoded.type_id(), id);
        assert_eq!(decoded.size(), 2048);
    }
}
