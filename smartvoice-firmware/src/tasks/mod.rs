//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod button;
pub mod player;

pub use button::button_task;
pub use player::player_task;
