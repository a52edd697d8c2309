use hashbrown::{HashMap, HashSet};

use crate::world::chunk::Chunk;
use crate::world::error::WorldError;
use crate::world::location::ChunkLocation;

/// Owns every resident chunk together with the set of locations that should currently be resident.
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: HashMap<ChunkLocation, Chunk>,
    area_of_interest: HashSet<ChunkLocation>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a chunk under its own location, returning the chunk it replaced.
    pub fn insert(&mut self, chunk: Chunk) -> Option<Chunk> {
        self.chunks.insert(chunk.location(), chunk)
    }

    pub fn get(&self, location: &ChunkLocation) -> Option<&Chunk> {
        self.chunks.get(location)
    }

    pub fn contains(&self, location: &ChunkLocation) -> bool {
        self.chunks.contains_key(location)
    }

    /// Removes a chunk. Refuses while its mesh task is still in flight.
    pub fn remove(&mut self, location: ChunkLocation) -> Result<Chunk, WorldError> {
        match self.chunks.get(&location) {
            None => return Err(WorldError::MissingChunk(location)),
            Some(chunk) if !chunk.can_be_unloaded() => return Err(WorldError::ChunkBusy(location)),
            Some(_) => {}
        }

        self.chunks
            .remove(&location)
            .ok_or(WorldError::MissingChunk(location))
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkLocation, &Chunk)> {
        self.chunks.iter()
    }

    pub fn locations(&self) -> impl Iterator<Item = ChunkLocation> + '_ {
        self.chunks.keys().copied()
    }

    pub fn area_of_interest(&self) -> &HashSet<ChunkLocation> {
        &self.area_of_interest
    }

    /// Replaces the area of interest and returns the previous one.
    pub fn set_area_of_interest(&mut self, area_of_interest: HashSet<ChunkLocation>) -> HashSet<ChunkLocation> {
        std::mem::replace(&mut self.area_of_interest, area_of_interest)
    }

    pub fn is_of_interest(&self, location: &ChunkLocation) -> bool {
        self.area_of_interest.contains(location)
    }

    /// Resident chunks whose location is no longer of interest.
    pub fn outside_interest(&self) -> impl Iterator<Item = ChunkLocation> + '_ {
        self.locations()
            .filter(|location| !self.is_of_interest(location))
    }
}
