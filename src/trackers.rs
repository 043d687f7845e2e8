/// Panoramic re-identification tracker (overlap passes with nearest-neighbour fallback)
///
pub mod reid;
