pub mod helix;
