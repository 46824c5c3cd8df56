use async_trait::async_trait;
use console::style;

use tandem::frontend::Frontend;

/// Terminal frontend surface: the intro banner and error toasts
pub struct ConsoleFrontend;

#[async_trait]
impl Frontend for ConsoleFrontend {
    async fn chat_started(&self) {
        println!("{}", style("chat started").dim());
    }

    fn notify_error(&self, message: &str) {
        eprintln!("{} {}", style("error:").red().bold(), message);
    }
}
