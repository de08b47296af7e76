pub mod apps_hub;
pub mod entities;
pub mod system;
pub mod tenant;
