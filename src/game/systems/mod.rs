pub mod collision;
pub mod locomotion;
pub mod teleport;
pub mod ghosts;
