//! Colours shared by the charts and the viewers

/// Particle / chart-row colours, cycled: red, green, blue, magenta, cyan, yellow
pub const PALETTE: [(u8, u8, u8); 6] = [
    (255, 0, 0),
    (0, 128, 0),
    (0, 0, 255),
    (191, 0, 191),
    (0, 191, 191),
    (191, 191, 0),
];

/// Opacity of drawn particles
pub const PARTICLE_ALPHA: f64 = 0.6;

pub const OUTLINE_BLACK: (u8, u8, u8) = (0, 0, 0);
pub const OUTLINE_GREEN: (u8, u8, u8) = (0, 128, 0);

pub fn color_at(i: usize) -> (u8, u8, u8) {
    PALETTE[i % PALETTE.len()]
}
