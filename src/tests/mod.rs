mod common;

mod config_loading;
mod routing_and_health;
