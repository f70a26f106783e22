// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology key types for arena-based storage.
//!
//! Each topology entity gets a unique, type-safe key for O(1) lookup in the
//! arena. Keys are created by `slotmap::SlotMap` and remain valid even after
//! other entities are removed (generational indices).

use slotmap::new_key_type;

new_key_type! {
    /// Key for a vertex (unique point in 3D space).
    pub struct VertexKey;

    /// Key for an undirected edge (shared by all its directed uses).
    pub struct EdgeKey;

    /// Key for a planar face (shared by its two oriented uses).
    pub struct FaceKey;

    /// Key for one occurrence of a vertex inside an edge use or point loop.
    pub struct VertexUseKey;

    /// Key for a directed traversal of an edge within one loop use.
    pub struct EdgeUseKey;

    /// Key for one oriented use of a closed boundary loop of a face use.
    pub struct LoopUseKey;

    /// Key for one of the two oriented uses of a face.
    pub struct FaceUseKey;
}

/// A key that can reference any topology entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopoKey {
    Vertex(VertexKey),
    Edge(EdgeKey),
    Face(FaceKey),
    VertexUse(VertexUseKey),
    EdgeUse(EdgeUseKey),
    LoopUse(LoopUseKey),
    FaceUse(FaceUseKey),
}

impl TopoKey {
    /// Returns the topology type of this key.
    pub fn topo_type(&self) -> TopoType {
        match self {
            TopoKey::Vertex(_) => TopoType::Vertex,
            TopoKey::Edge(_) => TopoType::Edge,
            TopoKey::Face(_) => TopoType::Face,
            TopoKey::VertexUse(_) => TopoType::VertexUse,
            TopoKey::EdgeUse(_) => TopoType::EdgeUse,
            TopoKey::LoopUse(_) => TopoType::LoopUse,
            TopoKey::FaceUse(_) => TopoType::FaceUse,
        }
    }
}

/// Discriminant for topology entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopoType {
    Vertex = 0,
    Edge = 1,
    Face = 2,
    VertexUse = 3,
    EdgeUse = 4,
    LoopUse = 5,
    FaceUse = 6,
}

impl TopoType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TopoType::Vertex => "Vertex",
            TopoType::Edge => "Edge",
            TopoType::Face => "Face",
            TopoType::VertexUse => "VertexUse",
            TopoType::EdgeUse => "EdgeUse",
            TopoType::LoopUse => "LoopUse",
            TopoType::FaceUse => "FaceUse",
        }
    }
}

impl std::fmt::Display for TopoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Conversion impls from specific keys to TopoKey
impl From<VertexKey> for TopoKey {
    fn from(k: VertexKey) -> Self {
        TopoKey::Vertex(k)
    }
}

impl From<EdgeKey> for TopoKey {
    fn from(k: EdgeKey) -> Self {
        TopoKey::Edge(k)
    }
}

impl From<FaceKey> for TopoKey {
    fn from(k: FaceKey) -> Self {
        TopoKey::Face(k)
    }
}

impl From<VertexUseKey> for TopoKey {
    fn from(k: VertexUseKey) -> Self {
        TopoKey::VertexUse(k)
    }
}

impl From<EdgeUseKey> for TopoKey {
    fn from(k: EdgeUseKey) -> Self {
        TopoKey::EdgeUse(k)
    }
}

impl From<LoopUseKey> for TopoKey {
    fn from(k: LoopUseKey) -> Self {
        TopoKey::LoopUse(k)
    }
}

impl From<FaceUseKey> for TopoKey {
    fn from(k: FaceUseKey) -> Self {
        TopoKey::FaceUse(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topo_type_names() {
        assert_eq!(TopoType::Vertex.as_str(), "Vertex");
        assert_eq!(TopoType::Edge.as_str(), "Edge");
        assert_eq!(TopoType::Face.as_str(), "Face");
        assert_eq!(TopoType::VertexUse.as_str(), "VertexUse");
        assert_eq!(TopoType::EdgeUse.as_str(), "EdgeUse");
        assert_eq!(TopoType::LoopUse.as_str(), "LoopUse");
        assert_eq!(TopoType::FaceUse.as_str(), "FaceUse");
    }

    #[test]
    fn topo_type_ordering() {
        assert!(TopoType::Vertex < TopoType::Edge);
        assert!(TopoType::Edge < TopoType::Face);
        assert!(TopoType::VertexUse < TopoType::EdgeUse);
        assert!(TopoType::EdgeUse < TopoType::LoopUse);
        assert!(TopoType::LoopUse < TopoType::FaceUse);
    }

    #[test]
    fn topo_type_display() {
        assert_eq!(TopoType::LoopUse.to_string(), "LoopUse");
    }
}
