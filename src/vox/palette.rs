/// Channel levels of MagicaVoxel's default 6x6x6 color cube, brightest first
const CUBE_LEVELS: [u8; 6] = [0xff, 0xcc, 0x99, 0x66, 0x33, 0x00];

/// Levels of the red, green, blue and gray ramps that close the palette
const RAMP_LEVELS: [u8; 10] = [0xee, 0xdd, 0xbb, 0xaa, 0x88, 0x77, 0x55, 0x44, 0x22, 0x11];

/// 256 RGBA colors addressed by voxel color index. Slot 0 is transparent.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [[u8; 4]; 256],
}

impl Palette {
    /// Build from the 256 entries of an `RGBA` chunk.
    ///
    /// File entry `k` lands in slot `k + 1`; the final file entry has no slot.
    pub fn from_rgba_chunk(entries: &[[u8; 4]; 256]) -> Self {
        let mut colors = [[0u8; 4]; 256];
        colors[1..].copy_from_slice(&entries[..255]);
        Self { colors }
    }

    pub fn color(&self, index: u8) -> [u8; 4] {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[[u8; 4]; 256] {
        &self.colors
    }
}

impl Default for Palette {
    /// The palette MagicaVoxel assigns to scenes without an `RGBA` chunk:
    /// a color cube without black, followed by four 10-step ramps.
    fn default() -> Self {
        let mut colors = [[0u8; 4]; 256];
        let mut slot = 1;

        for &r in &CUBE_LEVELS {
            for &g in &CUBE_LEVELS {
                for &b in &CUBE_LEVELS {
                    if r == 0 && g == 0 && b == 0 {
                        continue;
                    }
                    colors[slot] = [r, g, b, 0xff];
                    slot += 1;
                }
            }
        }

        for ramp in 0..4 {
            for &level in &RAMP_LEVELS {
                colors[slot] = match ramp {
                    0 => [level, 0, 0, 0xff],
                    1 => [0, level, 0, 0xff],
                    2 => [0, 0, level, 0xff],
                    _ => [level, level, level, 0xff],
                };
                slot += 1;
            }
        }

        Self { colors }
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Palette")
            .field("first", &self.colors[1])
            .field("last", &self.colors[255])
            .finish()
    }
}
