pub mod constants;
pub mod world;
pub mod state;
pub mod events;
pub mod input;
pub mod round;
pub mod systems;
pub mod game_loop;
