pub mod plotter;
#[cfg(feature = "vis")]
pub mod viewer2d;
