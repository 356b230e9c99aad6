//! Command-line arguments

use clap::{ArgGroup, Parser};

use crate::config::Config;
use crate::VERSION;

/// How the process should run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Serve the browser chat widget
    Web,
    /// Answer a single prompt and exit
    Cli { prompt: String },
}

#[derive(Parser, Debug)]
#[command(
    name = "toolchat",
    version = VERSION,
    about = "Chat with an AI-powered assistant",
    long_about = None
)]
#[command(group(ArgGroup::new("mode").required(true).args(["web", "cli"])))]
pub struct Cli {
    /// Run the app as a web chat server
    #[arg(long)]
    pub web: bool,

    /// Run the app in CLI mode
    #[arg(long, requires = "prompt")]
    pub cli: bool,

    /// Input text prompt for CLI mode
    #[arg(long)]
    pub prompt: Option<String>,

    /// Bind address for the web server
    #[arg(long)]
    pub host: Option<String>,

    /// Port for the web server
    #[arg(long)]
    pub port: Option<u16>,

    /// Chat model to use
    #[arg(long)]
    pub model: Option<String>,

    /// Log output format
    #[arg(long, value_parser = ["pretty", "json"])]
    pub log_format: Option<String>,
}

impl Cli {
    /// The selected run mode
    pub fn mode(&self) -> Mode {
        match self.prompt {
            Some(ref prompt) if self.cli => Mode::Cli {
                prompt: prompt.clone(),
            },
            _ => Mode::Web,
        }
    }

    /// Apply command-line overrides on top of the environment configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref host) = self.host {
            config.web.host = host.clone();
        }
        if let Some(port) = self.port {
            config.web.port = port;
        }
        if let Some(ref model) = self.model {
            config.openai.model = model.clone();
        }
        if let Some(ref format) = self.log_format {
            config.log.format = format.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_mode_with_prompt() {
        let cli =
            Cli::try_parse_from(["toolchat", "--cli", "--prompt", "What's the weather?"]).unwrap();
        assert_eq!(
            cli.mode(),
            Mode::Cli {
                prompt: "What's the weather?".to_string()
            }
        );
    }

    #[test]
    fn test_web_mode() {
        let cli = Cli::try_parse_from(["toolchat", "--web", "--port", "8080"]).unwrap();
        assert_eq!(cli.mode(), Mode::Web);

        let mut config = Config::minimal();
        cli.apply_to(&mut config);
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.web.host, "0.0.0.0");
    }

    #[test]
    fn test_cli_requires_prompt() {
        let err = Cli::try_parse_from(["toolchat", "--cli"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_web_and_cli_are_exclusive() {
        let err =
            Cli::try_parse_from(["toolchat", "--web", "--cli", "--prompt", "hi"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_a_mode_is_required() {
        let err = Cli::try_parse_from(["toolchat", "--prompt", "hi"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_model_and_log_overrides() {
        let cli = Cli::try_parse_from([
            "toolchat",
            "--web",
            "--model",
            "gpt-4o-mini",
            "--log-format",
            "json",
        ])
        .unwrap();

        let mut config = Config::minimal();
        cli.apply_to(&mut config);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.log.format, "json");

        assert!(Cli::try_parse_from(["toolchat", "--web", "--log-format", "xml"]).is_err());
    }
}
