//! Console View: line commands in, result lines out.

use anyhow::bail;
use converter_engine::{ConversionEngine, ConversionObserver};
use converter_types::{ConversionResult, Currency};

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Amount(String),
    From(String),
    To(String),
    Swap,
    List,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Parses a line. Blank lines yield `None`.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if words.next().is_some() {
            bail!("Too many arguments for {verb:?}");
        }

        let command = match (verb.to_ascii_lowercase().as_str(), arg) {
            ("amount", Some(value)) => Self::Amount(value.to_string()),
            ("from", Some(code)) => Self::From(code.to_string()),
            ("to", Some(code)) => Self::To(code.to_string()),
            ("swap", None) => Self::Swap,
            ("list", None) => Self::List,
            ("help", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            ("amount" | "from" | "to", None) => bail!("{verb} needs a value"),
            _ => bail!("Unknown command: {}", line.trim()),
        };
        Ok(Some(command))
    }
}

/// One picker label per line, in catalog order.
pub fn listing(currencies: &[Currency]) -> String {
    currencies
        .iter()
        .map(|currency| format!("  {}", currency.display_name()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub const HELP: &str = "\
Commands:
  amount <x>    set the amount to convert
  from <code>   set the source currency
  to <code>     set the target currency
  swap          exchange source and target
  list          show supported currencies
  quit          leave";

/// Applies a command to the engine. Returns false when the user asked to quit.
pub fn apply(engine: &ConversionEngine, command: ConsoleCommand) -> bool {
    match command {
        ConsoleCommand::Amount(input) => {
            if let Err(err) = engine.set_amount(&input) {
                println!("{err}. Amount stays {}", engine.session().amount);
            }
        }
        ConsoleCommand::From(code) => {
            if let Err(err) = engine.set_from_code(&code) {
                println!("{err}, try `list`");
            }
        }
        ConsoleCommand::To(code) => {
            if let Err(err) = engine.set_to_code(&code) {
                println!("{err}, try `list`");
            }
        }
        ConsoleCommand::Swap => engine.swap(),
        ConsoleCommand::List => println!("{}", listing(engine.currencies())),
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => return false,
    }
    true
}

/// Prints results and errors to stdout.
pub struct ConsoleView;

impl ConsoleView {
    pub fn render(result: &ConversionResult) -> String {
        format!(
            "{:.4} {} is equal to {:.4} {}  (1 {} = {:.4} {})",
            result.amount.value(),
            result.from.code,
            result.converted,
            result.to.code,
            result.from.code,
            result.rate,
            result.to.code,
        )
    }
}

impl ConversionObserver for ConsoleView {
    fn on_result(&self, result: &ConversionResult) {
        println!("{}", Self::render(result));
    }

    fn on_error(&self, message: &str) {
        println!("Conversion failed: {message}");
    }
}
