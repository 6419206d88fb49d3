use std::fmt;

use serde::{Deserialize, Serialize};

/// What the display texture shows.
///
/// `Plane` renders a 2D slice at z = 0; every other mode renders the full 3D
/// shape and picks one of its images.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Plane,
    /// Heightmap.
    Depth,
    #[default]
    Normals,
    Ssao,
    Shaded,
}

impl RenderMode {
    pub const ALL: [RenderMode; 5] = [
        RenderMode::Plane,
        RenderMode::Depth,
        RenderMode::Normals,
        RenderMode::Ssao,
        RenderMode::Shaded,
    ];

    #[inline]
    pub fn is_planar(self) -> bool {
        self == RenderMode::Plane
    }

    /// Keyboard shortcut mapping: 1 = plane ... 5 = shaded.
    pub fn from_digit(d: u8) -> Option<Self> {
        Self::ALL.get(usize::from(d).checked_sub(1)?).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Plane => "2D",
            RenderMode::Depth => "Heightmap",
            RenderMode::Normals => "Normals",
            RenderMode::Ssao => "SSAO",
            RenderMode::Shaded => "Shaded",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
