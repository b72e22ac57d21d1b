// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Chip topology: tiles in a 2-D mesh, cores within tiles, pipeline units
//! within cores.
//!
//! Construction order is fixed: tiles and cores first, then `build_mesh`
//! links the tiles and freezes the topology (`is_init`). All collections are
//! bounded by `ArchLimits`; exceeding a bound is a capacity error, mirroring
//! a hardware limit the simulated chip cannot exceed.

use tracing::{debug, trace};

use neuroperf_neural::types::{
    find_attr, Attribute, CapacityError, ConfigError, ConfigResult, CoreId, NeuronAddress, TileId,
};
use neuroperf_neural::SomaModelRegistry;

use crate::units::{AxonInput, AxonOutput, DendriteProcessor, SomaProcessor, SynapseProcessor};

/// Fixed hardware bounds for one design.
#[derive(Debug, Clone, Copy)]
pub struct ArchLimits {
    pub max_tiles: usize,
    pub max_cores_per_tile: usize,
    /// Neuron compartments per core.
    pub max_compartments: usize,
    /// Connection maps per axon input or output.
    pub max_connection_maps: usize,
}

impl Default for ArchLimits {
    // Loihi-flavored defaults.
    fn default() -> Self {
        Self {
            max_tiles: 256,
            max_cores_per_tile: 4,
            max_compartments: 16384,
            max_connection_maps: 65536,
        }
    }
}

impl ArchLimits {
    /// Upper bound on global core ids, used to size dense per-core tables.
    pub fn max_cores(&self) -> usize {
        self.max_tiles * self.max_cores_per_tile
    }
}

/// Mesh link directions, in link-slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// One mesh node: hosts cores and the link stubs to up to 4 neighbors.
#[derive(Debug)]
pub struct Tile {
    pub id: TileId,
    pub x: i64,
    pub y: i64,
    /// Neighbor tiles, indexed by `Direction`; `None` at mesh edges.
    pub links: [Option<TileId>; 4],
    pub cores: Vec<Core>,

    // Per-step accumulators.
    pub energy: f64,
    pub time: f64,

    // Interconnect cost constants.
    pub energy_east_west_hop: f64,
    pub time_east_west_hop: f64,
    pub energy_north_south_hop: f64,
    pub time_north_south_hop: f64,
    pub energy_spike_within_tile: f64,
    pub time_spike_within_tile: f64,
}

impl Tile {
    fn new(id: TileId) -> Self {
        Self {
            id,
            x: 0,
            y: 0,
            links: [None; 4],
            cores: Vec::new(),
            energy: 0.0,
            time: 0.0,
            energy_east_west_hop: 0.0,
            time_east_west_hop: 0.0,
            energy_north_south_hop: 0.0,
            time_north_south_hop: 0.0,
            energy_spike_within_tile: 0.0,
            time_spike_within_tile: 0.0,
        }
    }

    fn configure(&mut self, attrs: &[Attribute]) -> ConfigResult<()> {
        for a in attrs {
            match a.key.as_str() {
                "energy_east_west" => self.energy_east_west_hop = a.parse_f64()?,
                "latency_east_west" => self.time_east_west_hop = a.parse_f64()?,
                "energy_north_south" => self.energy_north_south_hop = a.parse_f64()?,
                "latency_north_south" => self.time_north_south_hop = a.parse_f64()?,
                "energy_spike_within_tile" => self.energy_spike_within_tile = a.parse_f64()?,
                "latency_spike_within_tile" => self.time_spike_within_tile = a.parse_f64()?,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn link_count(&self) -> usize {
        self.links.iter().filter(|l| l.is_some()).count()
    }
}

/// One core: the five pipeline units plus the table of neurons placed on it.
#[derive(Debug)]
pub struct Core {
    /// Globally unique core id.
    pub id: CoreId,
    /// Position within the owning tile.
    pub offset: usize,
    pub tile: TileId,

    pub axon_in: AxonInput,
    pub synapse: SynapseProcessor,
    pub dendrite: DendriteProcessor,
    pub soma: SomaProcessor,
    pub axon_out: AxonOutput,

    /// Neurons hosted by this core (weak references; the network owns them).
    pub neurons: Vec<NeuronAddress>,

    pub energy: f64,
    pub time: f64,
}

impl Core {
    fn new(id: CoreId, offset: usize, tile: TileId) -> Self {
        Self {
            id,
            offset,
            tile,
            axon_in: AxonInput::default(),
            synapse: SynapseProcessor::default(),
            dendrite: DendriteProcessor::default(),
            soma: SomaProcessor::default(),
            axon_out: AxonOutput::default(),
            // Bounded by `ArchLimits::max_compartments`, enforced at
            // placement time.
            neurons: Vec::new(),
            energy: 0.0,
            time: 0.0,
        }
    }
}

/// A complete chip design.
pub struct Architecture {
    pub name: String,
    limits: ArchLimits,
    registry: SomaModelRegistry,

    tiles: Vec<Tile>,
    /// (tile index, core offset) per global core id.
    core_locations: Vec<(usize, usize)>,

    pub noc_dimensions: u32,
    pub noc_width: usize,
    pub noc_height: usize,
    /// Mesh-wide barrier synchronization time added to every timestep.
    pub time_barrier: f64,

    is_init: bool,
}

impl Default for Architecture {
    fn default() -> Self {
        Self::new(ArchLimits::default())
    }
}

impl std::fmt::Debug for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Architecture")
            .field("name", &self.name)
            .field("tiles", &self.tiles.len())
            .field("cores", &self.core_locations.len())
            .field("noc", &(self.noc_width, self.noc_height))
            .field("is_init", &self.is_init)
            .finish()
    }
}

impl Architecture {
    pub fn new(limits: ArchLimits) -> Self {
        Self::with_registry(limits, SomaModelRegistry::with_builtins())
    }

    /// Build with a custom soma model registry (user-supplied models).
    pub fn with_registry(limits: ArchLimits, registry: SomaModelRegistry) -> Self {
        Self {
            name: String::new(),
            limits,
            registry,
            tiles: Vec::new(),
            core_locations: Vec::new(),
            noc_dimensions: 2,
            noc_width: 0,
            noc_height: 0,
            time_barrier: 0.0,
            is_init: false,
        }
    }

    /// Apply an `arch` description block.
    pub fn configure(&mut self, attrs: &[Attribute]) -> ConfigResult<()> {
        for a in attrs {
            match a.key.as_str() {
                "name" => self.name = a.value.clone(),
                "time_barrier" => self.time_barrier = a.parse_f64()?,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn limits(&self) -> &ArchLimits {
        &self.limits
    }

    pub fn is_init(&self) -> bool {
        self.is_init
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn core_count(&self) -> usize {
        self.core_locations.len()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.0]
    }

    pub fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id.0]
    }

    pub fn core(&self, id: CoreId) -> &Core {
        let (tile, offset) = self.core_locations[id.0];
        &self.tiles[tile].cores[offset]
    }

    pub fn core_mut(&mut self, id: CoreId) -> &mut Core {
        let (tile, offset) = self.core_locations[id.0];
        &mut self.tiles[tile].cores[offset]
    }

    /// Checked lookup of a core by tile index and core offset, for
    /// description and placement paths.
    pub fn try_core_at(&self, tile: usize, offset: usize) -> ConfigResult<CoreId> {
        self.tiles
            .get(tile)
            .and_then(|t| t.cores.get(offset))
            .map(|c| c.id)
            .ok_or_else(|| ConfigError::Validation(format!("no such core `{tile}.{offset}`")))
    }

    /// Manhattan hop counts between two tiles: (east-west, north-south).
    pub fn hops_between(&self, from: TileId, to: TileId) -> (u64, u64) {
        let a = &self.tiles[from.0];
        let b = &self.tiles[to.0];
        ((a.x - b.x).unsigned_abs(), (a.y - b.y).unsigned_abs())
    }

    /// Allocate the next tile slot and configure its cost constants.
    pub fn create_tile(&mut self, attrs: &[Attribute]) -> ConfigResult<TileId> {
        if self.tiles.len() >= self.limits.max_tiles {
            return Err(CapacityError::new("tiles", self.limits.max_tiles).into());
        }
        let id = TileId(self.tiles.len());
        let mut tile = Tile::new(id);
        tile.configure(attrs)?;
        self.tiles.push(tile);
        trace!(tile = %id, "tile created");
        Ok(id)
    }

    /// Allocate the next core slot within `tile` and assign its global id.
    pub fn create_core(&mut self, tile: TileId, _attrs: &[Attribute]) -> ConfigResult<CoreId> {
        let limits = self.limits;
        let tile_index = tile.0;
        if tile_index >= self.tiles.len() {
            return Err(ConfigError::Validation(format!("no such tile `{tile_index}`")));
        }
        if self.tiles[tile_index].cores.len() >= limits.max_cores_per_tile {
            return Err(CapacityError::new("cores per tile", limits.max_cores_per_tile).into());
        }

        let id = CoreId(self.core_locations.len());
        let offset = self.tiles[tile_index].cores.len();
        self.tiles[tile_index].cores.push(Core::new(id, offset, tile));
        self.core_locations.push((tile_index, offset));
        trace!(core = %id, tile = %tile, "core created");
        Ok(id)
    }

    pub fn create_axon_in(&mut self, core: CoreId, attrs: &[Attribute]) -> ConfigResult<()> {
        self.core_mut(core).axon_in.configure(attrs)
    }

    pub fn create_synapse(&mut self, core: CoreId, attrs: &[Attribute]) -> ConfigResult<()> {
        self.core_mut(core).synapse.configure(attrs)
    }

    pub fn create_dendrite(&mut self, core: CoreId, attrs: &[Attribute]) -> ConfigResult<()> {
        self.core_mut(core).dendrite.configure(attrs)
    }

    /// Configure a soma unit: resolve the named model through the registry,
    /// forward the attributes to it, then set the unit's cost constants.
    pub fn create_soma(&mut self, core: CoreId, attrs: &[Attribute]) -> ConfigResult<()> {
        let model_name = find_attr(attrs, "model").map(|a| a.value.clone());

        if let Some(name) = model_name {
            let mut model = self.registry.create(&name)?;
            model.configure(attrs)?;
            let soma = &mut self.core_mut(core).soma;
            soma.model_name = name;
            soma.model = model;
        } else {
            self.core_mut(core).soma.model.configure(attrs)?;
        }
        self.core_mut(core).soma.configure(attrs)
    }

    pub fn create_axon_out(&mut self, core: CoreId, attrs: &[Attribute]) -> ConfigResult<()> {
        self.core_mut(core).axon_out.configure(attrs)
    }

    /// Link the tiles into a width×height mesh and freeze the topology.
    ///
    /// The mesh is built after the tiles are all defined, because linking
    /// needs every neighbor to exist.
    pub fn build_mesh(&mut self, attrs: &[Attribute]) -> ConfigResult<()> {
        if self.tiles.is_empty() {
            return Err(ConfigError::MeshBeforeTiles);
        }

        let mut width = 0usize;
        let mut height = 0usize;
        for a in attrs {
            match a.key.as_str() {
                "dimensions" => self.noc_dimensions = a.parse_u32()?,
                "width" => width = a.parse_usize()?,
                "height" => height = a.parse_usize()?,
                _ => {}
            }
        }

        if width == 0 || height == 0 {
            return Err(ConfigError::Validation(
                "mesh requires positive width and height".into(),
            ));
        }
        if width * height != self.tiles.len() {
            return Err(ConfigError::Validation(format!(
                "mesh is {width}x{height} but {} tiles are defined",
                self.tiles.len()
            )));
        }

        for y in 0..height {
            for x in 0..width {
                let index = y * width + x;
                let neighbor = |nx: i64, ny: i64| -> Option<TileId> {
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        return None;
                    }
                    Some(TileId(ny as usize * width + nx as usize))
                };

                let tile = &mut self.tiles[index];
                tile.x = x as i64;
                tile.y = y as i64;
                tile.links[Direction::North as usize] = neighbor(x as i64, y as i64 - 1);
                tile.links[Direction::East as usize] = neighbor(x as i64 + 1, y as i64);
                tile.links[Direction::South as usize] = neighbor(x as i64, y as i64 + 1);
                tile.links[Direction::West as usize] = neighbor(x as i64 - 1, y as i64);

                // Every tile of a non-degenerate mesh touches 1-4 neighbors.
                let link_count = tile.link_count();
                debug_assert!(width * height == 1 || (1..=4).contains(&link_count));
                trace!(tile = %tile.id, x, y, links = link_count, "tile linked");
            }
        }

        self.noc_width = width;
        self.noc_height = height;
        self.is_init = true;
        debug!(width, height, "NoC mesh created");
        Ok(())
    }
}
