//! Index and identity types for mesh elements.
//!
//! Mesh elements live in arenas owned by the [`Mesh`](super::Mesh) and are
//! addressed by type-safe index wrappers. Vertices additionally carry a
//! [`VertexTag`], the structural identity that is identical across every
//! mesh built with the same density and landmark set. Correspondence
//! between meshes is established purely through these tags, never through
//! geometric proximity.

use std::fmt::{self, Debug};

/// A named anchor position on the outline.
///
/// Landmarks align shapes across cells: the same landmark marks the same
/// biological feature on every nucleus. The `Reference` landmark is
/// mandatory and is always forced onto peripheral slot 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LandmarkId {
    /// The reference point; peripheral slot 0 on every mesh.
    Reference,
    /// The orientation point opposite the reference.
    Orientation,
    /// An optional anterior anchor.
    Anterior,
    /// An optional posterior anchor.
    Posterior,
}

/// The structural identity of a vertex.
///
/// For a fixed density and landmark set the sequence of tags is the same
/// for every shape, which is what makes meshes from different nuclei
/// comparable edge-for-edge and face-for-face.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VertexTag {
    /// A vertex on the outline, identified by its peripheral slot.
    Peripheral(usize),
    /// An interior grid vertex at a fixed fractional position along the
    /// chord joining peripheral slots `row` and `N - row`.
    Internal {
        /// Index of the chord carrying this vertex.
        row: usize,
        /// Position index along the chord.
        col: usize,
    },
}

impl VertexTag {
    /// Whether this tag identifies a peripheral vertex.
    #[inline]
    pub fn is_peripheral(self) -> bool {
        matches!(self, VertexTag::Peripheral(_))
    }

    /// Whether this tag identifies an internal vertex.
    #[inline]
    pub fn is_internal(self) -> bool {
        matches!(self, VertexTag::Internal { .. })
    }
}

impl fmt::Display for VertexTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexTag::Peripheral(i) => write!(f, "P{}", i),
            VertexTag::Internal { row, col } => write!(f, "I{}.{}", row, col),
        }
    }
}

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId(u32);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index <= u32::MAX as usize);
                Self(index as u32)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(EdgeId, "E");
impl_index_type!(FaceId, "F");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let v = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert_eq!(format!("{:?}", v), "V(42)");
        assert_eq!(format!("{:?}", EdgeId::new(7)), "E(7)");
        assert_eq!(format!("{:?}", FaceId::new(0)), "F(0)");
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(VertexTag::Peripheral(3).to_string(), "P3");
        assert_eq!(VertexTag::Internal { row: 2, col: 1 }.to_string(), "I2.1");
    }

    #[test]
    fn test_tag_kind_predicates() {
        assert!(VertexTag::Peripheral(0).is_peripheral());
        assert!(!VertexTag::Peripheral(0).is_internal());
        assert!(VertexTag::Internal { row: 1, col: 0 }.is_internal());
    }

    #[test]
    fn test_landmark_ordering() {
        // Reference sorts first; landmark maps iterate in this order.
        assert!(LandmarkId::Reference < LandmarkId::Orientation);
        assert!(LandmarkId::Orientation < LandmarkId::Anterior);
    }
}
