pub mod apps_hub;
pub mod tenant;
pub mod user;
