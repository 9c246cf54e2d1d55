use bevy::prelude::*;

use super::height_field::CornerRef;
use super::mesh_builder::TerrainVertex;

/// Marker on the single entity carrying the full-grid terrain mesh.
#[derive(Component, Reflect)]
pub struct TerrainSurface;

/// Marker on the corner highlight overlay entity.
#[derive(Component, Reflect)]
pub struct HighlightOverlay;

/// Cached vertex stream of the terrain surface.
///
/// Transitions: `Dirty` → `Clean` on regeneration, `Clean` → `Dirty` whenever
/// the height field reports a change.
#[derive(Resource, Default, Clone)]
pub enum MeshCache {
    /// Stream out of date; regenerate before drawing.
    #[default]
    Dirty,
    /// Stream matches the height field.
    Clean { vertices: Vec<TerrainVertex> },
}

impl MeshCache {
    /// True when the stream has to be rebuilt.
    pub fn needs_rebuild(&self) -> bool {
        matches!(self, Self::Dirty)
    }

    /// `Clean` → `Dirty`, dropping the stale stream.
    pub fn invalidate(&mut self) {
        *self = Self::Dirty;
    }

    /// `Dirty` → `Clean` with a freshly built stream.
    pub fn mark_clean(&mut self, vertices: Vec<TerrainVertex>) {
        *self = Self::Clean { vertices };
    }

    /// Cached stream, if clean.
    pub fn vertices(&self) -> Option<&[TerrainVertex]> {
        match self {
            Self::Dirty => None,
            Self::Clean { vertices } => Some(vertices),
        }
    }
}

/// Corner currently under the cursor, or held by a drag.
#[derive(Resource, Default, Debug, PartialEq, Reflect)]
pub struct PointedCorner(pub Option<CornerRef>);

/// An in-progress vertical drag on a corner.
#[derive(Resource, Default, Debug)]
pub enum DragState {
    /// Left button up.
    #[default]
    Idle,
    /// Left button held since pressing on `corner`.
    Dragging {
        /// Corner being moved.
        corner: CornerRef,
        /// Cursor y at the last emitted step, in window pixels.
        anchor_y: f32,
    },
}

impl DragState {
    /// True while a drag holds a corner.
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}
