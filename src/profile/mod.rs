//! User profiles: personal or business, set up on first use.

mod core;
mod setup;

pub use core::{Profile, ProfileFormData, ProfileKind, get_profile, save_profile};
pub use setup::{get_profile_setup_page, save_profile_endpoint};
