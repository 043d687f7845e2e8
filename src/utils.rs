/// Bounding boxes
pub mod bbox;

/// Wrap-around geometry for equirectangular frames
pub mod panorama;
