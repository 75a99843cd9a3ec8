mod get;
mod patch;

pub use get::{get_profile, ProfileResponse};
pub use patch::patch_profile;
