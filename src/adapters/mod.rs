pub mod clock;
pub mod registry;
