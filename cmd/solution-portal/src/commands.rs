//! Line commands typed at the prompt. Numbers are the 1-based labels printed
//! next to each listing entry.

use std::str::FromStr;

use domains::ExerciseType;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Department(usize),
    Course(usize),
    Type(ExerciseType),
    Year(usize),
    Open(usize),
    View(usize),
    Left,
    Right,
    Escape,
    Thumb(usize),
    Close,
    Back,
    Retry,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`, type `help`")]
    Unknown(String),

    #[error("`{0}` needs a number, e.g. `{0} 1`")]
    MissingNumber(&'static str),

    #[error("`{0}` is not a listing number")]
    BadNumber(String),

    #[error("`type` needs `td` or `exam`")]
    MissingType,

    #[error("`{0}` is not an exercise type, use `td` or `exam`")]
    BadType(String),
}

fn number(word: &'static str, arg: Option<&str>) -> Result<usize, CommandError> {
    let arg = arg.ok_or(CommandError::MissingNumber(word))?;
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::BadNumber(arg.to_owned())),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(CommandError::Empty);
        };
        let arg = words.next();
        let command = match head.to_ascii_lowercase().as_str() {
            "ls" | "list" => Self::List,
            "dept" | "department" => Self::Department(number("dept", arg)?),
            "course" => Self::Course(number("course", arg)?),
            "type" => {
                let arg = arg.ok_or(CommandError::MissingType)?;
                Self::Type(arg.parse().map_err(|_| CommandError::BadType(arg.to_owned()))?)
            }
            "year" => Self::Year(number("year", arg)?),
            "open" => Self::Open(number("open", arg)?),
            "view" => Self::View(number("view", arg)?),
            "left" | "prev" => Self::Left,
            "right" | "next" => Self::Right,
            "esc" | "escape" => Self::Escape,
            "thumb" => Self::Thumb(number("thumb", arg)?),
            "close" => Self::Close,
            "back" => Self::Back,
            "retry" => Self::Retry,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return Err(CommandError::Unknown(head.to_owned())),
        };
        Ok(command)
    }
}
