//! Command parsing for the interactive session.

use std::path::PathBuf;

/// Help text printed by the `help` command.
pub const HELP: &str = "Commands:
  show | next                 show a random quote
  last                        show the last displayed quote again
  add <text...> <category>    add a quote (category is the last word)
  list                        list quotes of the selected category
  categories                  list categories
  filter <category|all>       select a category
  sync                        sync with the remote now
  export <file>               write all quotes to a JSON file
  import <file>               append quotes from a JSON file
  status                      show store and sync status
  help                        show this help
  quit | exit                 leave the session";

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Show,
    Last,
    Add { text: String, category: String },
    List,
    Categories,
    Filter(String),
    Sync,
    Export(PathBuf),
    Import(PathBuf),
    Status,
    Help,
    Quit,
    Empty,
}

impl std::str::FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let command = match word.to_lowercase().as_str() {
            "" => Self::Empty,
            "show" | "next" => Self::Show,
            "last" => Self::Last,
            "add" => {
                let (text, category) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or("usage: add <text...> <category>")?;
                Self::Add {
                    text: text.trim().to_string(),
                    category: category.to_string(),
                }
            }
            "list" => Self::List,
            "categories" => Self::Categories,
            "filter" => Self::Filter(required(rest, "usage: filter <category|all>")?),
            "sync" => Self::Sync,
            "export" => Self::Export(required(rest, "usage: export <file>")?.into()),
            "import" => Self::Import(required(rest, "usage: import <file>")?.into()),
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command: {other} (try 'help')")),
        };

        Ok(command)
    }
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(usage.to_string())
    } else {
        Ok(rest.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("next".parse::<ShellCommand>(), Ok(ShellCommand::Show));
        assert_eq!("  SYNC ".parse::<ShellCommand>(), Ok(ShellCommand::Sync));
        assert_eq!("".parse::<ShellCommand>(), Ok(ShellCommand::Empty));
        assert_eq!("exit".parse::<ShellCommand>(), Ok(ShellCommand::Quit));
        assert_eq!("last".parse::<ShellCommand>(), Ok(ShellCommand::Last));
    }

    #[test]
    fn test_parse_add() {
        assert_eq!(
            "add Be kind,  always.  Life".parse::<ShellCommand>(),
            Ok(ShellCommand::Add {
                category: "Life".into(),
                text: "Be kind,  always.".into(),
            })
        );
        assert!("add Life".parse::<ShellCommand>().is_err());
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(
            "filter Motivation".parse::<ShellCommand>(),
            Ok(ShellCommand::Filter("Motivation".into()))
        );
        assert_eq!(
            "export out.json".parse::<ShellCommand>(),
            Ok(ShellCommand::Export(PathBuf::from("out.json")))
        );
        assert!("filter".parse::<ShellCommand>().is_err());
        assert!("dance".parse::<ShellCommand>().is_err());
    }
}
