/// Which way the player sprite is facing. Selects the sprite image only;
/// there are no animation frames.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    #[default]
    Idle,
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    /// All states in display order.
    pub const ALL: &'static [Facing] = &[
        Facing::Idle,
        Facing::Up,
        Facing::Down,
        Facing::Left,
        Facing::Right,
    ];

    /// Short lowercase name, also used as the sprite image key in config.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
