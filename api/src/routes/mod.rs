pub mod health;
pub mod root_route;
pub mod webhook;
