pub mod burner;
pub mod home;
pub mod not_found;
pub mod token;

pub use not_found::not_found_handler;
