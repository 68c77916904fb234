pub mod date_window;
pub mod ticket_status;
pub mod ticket_text;
