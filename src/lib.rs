//! Ghostyard simulation library
//!
//! Headless core of a haunted-graveyard VR round: ground-following player
//! locomotion with circle collisions, a teleport arc with slope validation,
//! a fading and chasing ghost swarm and the round timer that ties them
//! together. Rendering, audio and device input stay with the host; they
//! reach the core through `HeightQuery`, `ColliderSource`, `FrameInput`
//! and drained `GameEvent`s.

pub mod config;
pub mod util;
pub mod game;
pub mod metrics;
