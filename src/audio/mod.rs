//! Audio buffers, WAV I/O, and the enhancement chain

pub mod buffer;
pub mod denoise;
pub mod effects;
pub mod enhance;
pub mod io;

pub use buffer::AudioBuffer;
pub use denoise::SpectralGate;
pub use effects::{Compressor, LowShelf, NoiseGate};
pub use enhance::{enhance_buffer, enhance_file};
