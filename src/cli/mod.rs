pub mod portfolio;
pub mod rankings;
pub mod setup;
pub mod ui;
