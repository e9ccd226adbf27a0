use std::fmt::Display;

use crossterm::tty::IsTty;
use inquire::error::InquireError;
use inquire::ui::{Attributes, RenderConfig, StyleSheet, Styled};

use super::TERMINAL_STDERR;

/// Free text input.
#[derive(Debug, Clone, Default)]
pub struct Text;

#[derive(Clone)]
pub struct Select<T> {
    pub options: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct Dialog<'a, Type> {
    pub message: &'a str,
    pub help_message: Option<&'a str>,
    pub typed: Type,
}

impl Dialog<'_, Text> {
    pub async fn prompt(self) -> inquire::error::InquireResult<String> {
        let message = self.message.to_owned();
        let help_message: Option<String> = self.help_message.map(ToOwned::to_owned);

        join_blocking(move || {
            let _stderr_lock = TERMINAL_STDERR.lock();

            let mut dialog = inquire::Text::new(&message).with_render_config(products_theme());

            if let Some(ref help_message) = help_message {
                dialog = dialog.with_help_message(help_message);
            }

            dialog.prompt()
        })
        .await
    }
}

struct Choice(usize, String);
impl Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.1.fmt(f)
    }
}

impl<T: Display> Dialog<'_, Select<T>> {
    pub async fn prompt(self) -> inquire::error::InquireResult<T> {
        let message = self.message.to_owned();
        let help_message = self.help_message.map(ToOwned::to_owned);
        let mut options = self.typed.options;

        let choices = options
            .iter()
            .map(ToString::to_string)
            .enumerate()
            .map(|(id, value)| Choice(id, value))
            .collect();

        let Choice(id, _) = join_blocking(move || {
            let _stderr_lock = TERMINAL_STDERR.lock();

            let mut dialog =
                inquire::Select::new(&message, choices).with_render_config(products_theme());

            if let Some(ref help_message) = help_message {
                dialog = dialog.with_help_message(help_message);
            }

            dialog.prompt()
        })
        .await?;

        Ok(options.remove(id))
    }
}

/// Run a blocking prompt off the async runtime.
async fn join_blocking<T: Send + 'static>(
    prompt: impl FnOnce() -> inquire::error::InquireResult<T> + Send + 'static,
) -> inquire::error::InquireResult<T> {
    tokio::task::spawn_blocking(prompt)
        .await
        .map_err(|e| InquireError::Custom(Box::new(e)))?
}

/// True if the user closed the prompt with escape or ctrl-c.
pub fn is_cancelled(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

impl Dialog<'_, ()> {
    /// True if stderr, stdin and stdout are ttys
    pub fn can_prompt() -> bool {
        if std::env::var("_PRODUCTS_NO_PROMPT").is_ok_and(|v| v == "1") {
            return false;
        }
        std::io::stderr().is_tty() && std::io::stdin().is_tty() && std::io::stdout().is_tty()
    }
}

pub fn products_theme() -> RenderConfig<'static> {
    let mut render_config = RenderConfig::default_colored();

    render_config.answered_prompt_prefix = Styled::new(">");
    render_config.highlighted_option_prefix = Styled::new(">");
    render_config.prompt_prefix = Styled::new("?");
    render_config.prompt = StyleSheet::new().with_attr(Attributes::BOLD);

    render_config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_errors() {
        assert!(is_cancelled(&InquireError::OperationCanceled));
        assert!(is_cancelled(&InquireError::OperationInterrupted));
        assert!(!is_cancelled(&InquireError::NotTTY));
    }

    #[test]
    fn no_prompt_override() {
        temp_env::with_var("_PRODUCTS_NO_PROMPT", Some("1"), || {
            assert!(!Dialog::can_prompt());
        });
    }
}
