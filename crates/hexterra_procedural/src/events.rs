//! # Chunk Events
//!
//! Notifications for the presentation layer. The streamer pushes, the
//! renderer drains, possibly from another thread.

use std::collections::VecDeque;
use std::sync::Arc;

use hexterra_core::{ChunkCoord, ChunkMesh};
use parking_lot::Mutex;

/// A change to the set of visible chunk meshes.
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkEvent {
    /// First mesh of a newly loaded chunk.
    Added {
        /// Chunk position.
        coord: ChunkCoord,
        /// World-space origin the mesh vertices are relative to.
        origin: [f32; 3],
        /// Surface geometry.
        mesh: Arc<ChunkMesh>,
    },
    /// Replacement mesh for a loaded chunk.
    Updated {
        /// Chunk position.
        coord: ChunkCoord,
        /// World-space origin the mesh vertices are relative to.
        origin: [f32; 3],
        /// Surface geometry.
        mesh: Arc<ChunkMesh>,
    },
    /// The chunk was unloaded; drop its mesh.
    Removed {
        /// Chunk position.
        coord: ChunkCoord,
    },
}

impl ChunkEvent {
    /// Chunk the event refers to.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        match self {
            Self::Added { coord, .. } | Self::Updated { coord, .. } | Self::Removed { coord } => {
                *coord
            }
        }
    }

    /// Mesh carried by the event, if any.
    #[must_use]
    pub fn mesh(&self) -> Option<&Arc<ChunkMesh>> {
        match self {
            Self::Added { mesh, .. } | Self::Updated { mesh, .. } => Some(mesh),
            Self::Removed { .. } => None,
        }
    }
}

/// Shared FIFO of [`ChunkEvent`]s. Clones share the same queue.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<VecDeque<ChunkEvent>>>,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&self, event: ChunkEvent) {
        self.inner.lock().push_back(event);
    }

    /// Removes the oldest event.
    #[must_use]
    pub fn pop(&self) -> Option<ChunkEvent> {
        self.inner.lock().pop_front()
    }

    /// Removes and returns every pending event, oldest first.
    pub fn drain(&self) -> Vec<ChunkEvent> {
        self.inner.lock().drain(..).collect()
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether no events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order_and_shared_handles() {
        let queue = EventQueue::new();
        let reader = queue.clone();
        let mesh = Arc::new(ChunkMesh::default());

        queue.push(ChunkEvent::Added {
            coord: ChunkCoord::new(0, 0),
            origin: [0.0; 3],
            mesh: Arc::clone(&mesh),
        });
        queue.push(ChunkEvent::Removed {
            coord: ChunkCoord::new(1, 0),
        });

        assert_eq!(reader.len(), 2);
        let first = reader.pop().unwrap();
        assert_eq!(first.coord(), ChunkCoord::new(0, 0));
        assert!(first.mesh().is_some());

        let rest = reader.drain();
        assert_eq!(rest.len(), 1);
        assert!(rest[0].mesh().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_from_another_thread() {
        let queue = EventQueue::new();
        for x in 0..10 {
            queue.push(ChunkEvent::Removed {
                coord: ChunkCoord::new(x, 0),
            });
        }
        let reader = queue.clone();
        let drained = std::thread::spawn(move || reader.drain()).join().unwrap();
        assert_eq!(drained.len(), 10);
        assert_eq!(drained[9].coord(), ChunkCoord::new(9, 0));
    }
}
