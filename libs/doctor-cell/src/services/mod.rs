pub mod roster;
pub mod slots;

pub use roster::RosterService;
pub use slots::{available_slots, generate_working_slots};
