pub mod animation;
pub mod body;
pub mod camera;
pub mod config;
pub mod controls;
pub mod error;
pub mod graphics;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod state;
pub mod vertex;
