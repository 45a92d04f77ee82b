//! Line commands understood by the interactive studio.

use crate::models::AspectRatio;
use crate::{Error, Result};
use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  prompt <text>     set the prompt (empty clears it)
  style <name>      pick a style preset (see `styles`)
  suffix <text>     use a free-text style suffix (empty for none)
  styles [--json]   list style presets
  ratio <ratio>     set the aspect ratio (see `ratios`)
  ratios            list aspect ratios
  ref <path>        attach a reference image
  unref             remove the reference image
  reset             clear prompt and reference image
  generate          generate an image
  gallery [--json]  list generated images, newest first
  view <id> [--json]
                    show details of an image
  close             close the viewer
  save [id]         save an image (defaults to the one being viewed)
  status            show current prompt, settings and last error
  help              show this help
  quit              leave the studio";

const JSON_FLAG: &str = "--json";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Prompt(String),
    Style(String),
    Suffix(String),
    Styles { json: bool },
    Ratio(AspectRatio),
    Ratios,
    Reference(PathBuf),
    Unreference,
    Reset,
    Generate,
    Gallery { json: bool },
    View { id: String, json: bool },
    Close,
    Save(Option<String>),
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim_start();
        if line.trim().is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim_end()),
            None => (line.trim_end(), ""),
        };
        let arg = rest.trim();

        let command = match verb.to_ascii_lowercase().as_str() {
            // Prompt text is kept as typed, apart from the separator.
            "prompt" => Command::Prompt(rest.to_string()),
            "style" => Command::Style(required(verb, arg)?.to_string()),
            "suffix" => Command::Suffix(rest.to_string()),
            "styles" => Command::Styles {
                json: json_only(verb, arg)?,
            },
            "ratio" => Command::Ratio(required(verb, arg)?.parse()?),
            "ratios" => Command::Ratios,
            "ref" => Command::Reference(PathBuf::from(required(verb, arg)?)),
            "unref" => Command::Unreference,
            "reset" => Command::Reset,
            "generate" | "go" => Command::Generate,
            "gallery" | "ls" => Command::Gallery {
                json: json_only(verb, arg)?,
            },
            "view" => {
                let (id, json) = take_json_flag(arg);
                Command::View {
                    id: required(verb, &id)?.to_string(),
                    json,
                }
            }
            "close" => Command::Close,
            "save" => Command::Save((!arg.is_empty()).then(|| arg.to_string())),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(Error::InvalidInput(format!(
                    "Unknown command '{}'. Type `help` for a list of commands.",
                    other
                )))
            }
        };

        Ok(Some(command))
    }
}

fn required<'a>(verb: &str, arg: &'a str) -> Result<&'a str> {
    if arg.is_empty() {
        Err(Error::InvalidInput(format!("`{}` needs an argument", verb)))
    } else {
        Ok(arg)
    }
}

/// Remove `--json` from the arguments, reporting whether it was there.
fn take_json_flag(arg: &str) -> (String, bool) {
    let mut json = false;
    let rest = arg
        .split_whitespace()
        .filter(|word| {
            let flag = *word == JSON_FLAG;
            json |= flag;
            !flag
        })
        .collect::<Vec<_>>()
        .join(" ");
    (rest, json)
}

fn json_only(verb: &str, arg: &str) -> Result<bool> {
    match take_json_flag(arg) {
        (rest, json) if rest.is_empty() => Ok(json),
        (rest, _) => Err(Error::InvalidInput(format!(
            "`{}` takes no argument besides {} (got '{}')",
            verb, JSON_FLAG, rest
        ))),
    }
}
