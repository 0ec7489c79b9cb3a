/// How SHR/SHL compute the flag in VF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftQuirk {
    /// VF gets bit 0 on SHR and bit 7 on SHL
    Canonical,
    /// VF gets bit 3 on SHR and is always cleared on SHL, for ROMs tuned
    /// against interpreters that got this wrong
    Reference,
}

/// What DRW does with pixels past the right or bottom edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteEdge {
    /// wrap around to the opposite edge
    Wrap,
    /// drop them; the starting coordinate itself still wraps
    Clip,
}

/// Compatibility knobs; the defaults suit most programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub shift: ShiftQuirk,
    pub sprite_edge: SpriteEdge,
    /// RND seed, `None` to seed from the OS
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shift: ShiftQuirk::Canonical,
            sprite_edge: SpriteEdge::Wrap,
            seed: None,
        }
    }
}

impl Config {
    pub fn with_shift(mut self, shift: ShiftQuirk) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_sprite_edge(mut self, sprite_edge: SpriteEdge) -> Self {
        self.sprite_edge = sprite_edge;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
