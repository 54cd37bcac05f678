// Domain layer - Plain data and pure rules, no I/O
pub mod chart;
pub mod overview;
pub mod sensor;
pub mod session;
pub mod tile;
