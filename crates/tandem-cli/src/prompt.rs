use anyhow::Result;

use tandem::models::message::Message;

pub mod rustyline;

pub trait Prompt {
    fn render(&mut self, message: Box<Message>);
    fn render_raw(&mut self, content: &str);
    fn render_error(&mut self, content: &str);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&self);
    fn close(&self);
}

pub struct Input {
    pub input_type: InputType,
    // Optional content as some inputs are pure control flow (e.g. Exit)
    pub content: Option<String>,
}

pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Command,  // Slash command for the session to handle
    Exit,     // User wants to exit the session
}

pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_bat_theme(&self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}
