// Presentation layer - Terminal form and menu
pub mod console;
pub mod form;
