pub mod app;
pub mod command;
pub mod dispatcher;
pub mod keybinding_validator;
pub mod keybindings;
pub mod keybindings_default;
pub mod pages;
pub mod stack;
pub mod view;
pub mod viewport;
pub mod wrapper;
