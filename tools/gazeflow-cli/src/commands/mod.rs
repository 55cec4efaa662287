pub mod replay;
pub mod synth;
