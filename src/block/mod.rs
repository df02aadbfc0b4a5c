//! Block-type metadata
//!
//! Chunks store raw [`BlockId`]s. Everything the mesher and the tick rules need
//! to know about a type (visibility, transparency, model, atlas textures) comes
//! from the read-only [`BlockRegistry`].

pub mod ids;
pub mod registry;

pub use registry::BlockRegistry;

/// Identifier of a block type, as stored in chunk voxel arrays
pub type BlockId = u16;

/// Geometry emitted for a block type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelType {
    /// Full cube, faces culled against transparent neighbours
    Solid,
    SlabBottom,
    SlabTop,
    /// Two crossed vertical planes
    Plant2Face,
    Plant4Face,
    /// Cube drawn in the translucent pass, faces culled against renderable neighbours
    Liquid,
    /// Thin overlay on top of the block below
    SurfaceOnly,
    /// Crossed planes plus a surface overlay
    PlantSurface2Face,
}

/// Face direction, in the atlas/lighting order used by the mesher
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Top = 0,
    NegX = 1,
    PosX = 2,
    NegZ = 3,
    PosZ = 4,
    Bottom = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Top,
        Direction::NegX,
        Direction::PosX,
        Direction::NegZ,
        Direction::PosZ,
        Direction::Bottom,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Broad material class, used for tool and sound selection by the game
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Material {
    None,
    Rock,
    Wood,
    Soil,
    Organic,
}

/// Atlas texture assignment for the six faces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockTextures {
    /// Same texture on every face
    Single(u16),
    /// `top` on top and bottom, `sides` on the four sides
    TopSides { top: u16, sides: u16 },
    TopBottomSides { top: u16, bottom: u16, sides: u16 },
}

impl BlockTextures {
    /// Atlas index for the face looking in `dir`
    pub fn for_direction(&self, dir: Direction) -> u16 {
        match *self {
            BlockTextures::Single(t) => t,
            BlockTextures::TopSides { top, sides } => match dir {
                Direction::Top | Direction::Bottom => top,
                _ => sides,
            },
            BlockTextures::TopBottomSides { top, bottom, sides } => match dir {
                Direction::Top => top,
                Direction::Bottom => bottom,
                _ => sides,
            },
        }
    }
}

/// Item dropped when a block is broken
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockDrop {
    pub item: &'static str,
    pub count: u8,
}

/// Static description of one block type
#[derive(Clone, Debug)]
pub struct BlockInfo {
    pub id: BlockId,
    pub name: &'static str,
    pub material: Material,
    pub textures: BlockTextures,
    pub model: ModelType,
    pub renderable: bool,
    pub transparent: bool,
    pub collision: bool,
    pub touchable: bool,
    pub harvestable: bool,
    pub storage: bool,
    /// Changes state over simulated time and keeps a tickable record
    pub tickable: bool,
    /// Seconds to break with bare hands
    pub breaking_time: f32,
    pub drop: Option<BlockDrop>,
}

impl BlockInfo {
    /// Opaque, solid, collidable cube with a single texture.
    pub fn new(name: &'static str, material: Material, texture: u16) -> Self {
        Self {
            id: 0,
            name,
            material,
            textures: BlockTextures::Single(texture),
            model: ModelType::Solid,
            renderable: true,
            transparent: false,
            collision: true,
            touchable: true,
            harvestable: false,
            storage: false,
            tickable: false,
            breaking_time: 1.0,
            drop: None,
        }
    }

    pub fn textures(mut self, textures: BlockTextures) -> Self {
        self.textures = textures;
        self
    }

    pub fn model(mut self, model: ModelType) -> Self {
        self.model = model;
        self
    }

    pub fn breaking_time(mut self, seconds: f32) -> Self {
        self.breaking_time = seconds;
        self
    }

    pub fn drops(mut self, item: &'static str, count: u8) -> Self {
        self.drop = Some(BlockDrop { item, count });
        self
    }

    /// Transparent and walk-through, the shape shared by plants and liquids.
    pub fn see_through(mut self) -> Self {
        self.transparent = true;
        self.collision = false;
        self
    }

    pub fn invisible(mut self) -> Self {
        self.renderable = false;
        self.touchable = false;
        self
    }

    pub fn harvestable(mut self) -> Self {
        self.harvestable = true;
        self
    }

    pub fn storage(mut self) -> Self {
        self.storage = true;
        self
    }

    pub fn tickable(mut self) -> Self {
        self.tickable = true;
        self
    }

    /// Atlas index for the face looking in `dir`
    #[inline]
    pub fn texture(&self, dir: Direction) -> u16 {
        self.textures.for_direction(dir)
    }
}
