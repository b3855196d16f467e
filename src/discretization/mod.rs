pub mod generator;
pub mod interpolate;
pub mod mesh;
pub mod schemes;
pub mod stencil;
