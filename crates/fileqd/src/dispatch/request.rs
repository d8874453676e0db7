//! Request parsing for the dispatch loop.
//!
//! A request is one text line: a case-sensitive command token followed by
//! whitespace-separated arguments. Parsing happens in two steps. The line is
//! first split into a [`CommandRequest`]; the request is then checked against
//! the argument shape of its command and converted into a typed [`Command`].

use crate::query::{ArchiveFilter, MAX_EXTENSIONS, SortKey};

use super::errors::DispatchError;

/// Commands understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `dirlist -a|-t`
    DirList,
    /// `w24fn <name>`
    FileName,
    /// `w24fz <min> <max>`
    FileSize,
    /// `w24ft <ext>...`
    FileType,
    /// `w24fdb <date>`
    DateBefore,
    /// `w24fda <date>`
    DateAfter,
    /// `quitc`
    Quit,
}

impl CommandKind {
    /// Matches a command token exactly.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "dirlist" => Some(Self::DirList),
            "w24fn" => Some(Self::FileName),
            "w24fz" => Some(Self::FileSize),
            "w24ft" => Some(Self::FileType),
            "w24fdb" => Some(Self::DateBefore),
            "w24fda" => Some(Self::DateAfter),
            "quitc" => Some(Self::Quit),
            _ => None,
        }
    }

    /// Protocol name of the command.
    pub fn name(self) -> &'static str {
        match self {
            Self::DirList => "dirlist",
            Self::FileName => "w24fn",
            Self::FileSize => "w24fz",
            Self::FileType => "w24ft",
            Self::DateBefore => "w24fdb",
            Self::DateAfter => "w24fda",
            Self::Quit => "quitc",
        }
    }
}

/// Typed command ready for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List root subdirectories.
    ListDirectories(SortKey),
    /// Report metadata of one root file.
    InspectFile(String),
    /// Archive root files selected by a filter.
    Archive(ArchiveFilter),
    /// Close the connection.
    Quit,
}

/// Tokenised request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    kind: CommandKind,
    arguments: Vec<String>,
}

impl CommandRequest {
    /// Splits a request line into a command and its arguments.
    ///
    /// Surrounding whitespace, including the line terminator, is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownCommand`] when the line is blank or
    /// starts with an unrecognised token.
    pub fn parse(line: &[u8]) -> Result<Self, DispatchError> {
        let text = String::from_utf8_lossy(line);
        let mut tokens = text.split_whitespace();
        let token = tokens.next().unwrap_or_default();
        let kind =
            CommandKind::from_token(token).ok_or_else(|| DispatchError::unknown_command(token))?;
        Ok(Self {
            kind,
            arguments: tokens.map(str::to_owned).collect(),
        })
    }

    /// Command named by the request.
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Validates the arguments and produces a typed command.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidSyntax`] when the argument count or an
    /// argument value does not fit the command.
    pub fn into_command(self) -> Result<Command, DispatchError> {
        let name = self.kind.name();
        match self.kind {
            CommandKind::DirList => {
                let [flag] = exactly::<1>(name, &self.arguments)?;
                SortKey::from_flag(flag)
                    .map(Command::ListDirectories)
                    .ok_or_else(|| DispatchError::invalid_syntax(name, "expected -a or -t"))
            }
            CommandKind::FileName => {
                let [file] = exactly::<1>(name, &self.arguments)?;
                Ok(Command::InspectFile(file.clone()))
            }
            CommandKind::FileSize => {
                let [min, max] = exactly::<2>(name, &self.arguments)?;
                Ok(Command::Archive(ArchiveFilter::size_range(
                    parse_size(name, min)?,
                    parse_size(name, max)?,
                )))
            }
            CommandKind::FileType => ArchiveFilter::extensions(self.arguments)
                .map(Command::Archive)
                .ok_or_else(|| {
                    DispatchError::invalid_syntax(
                        name,
                        format!("expected 1 to {MAX_EXTENSIONS} extensions"),
                    )
                }),
            CommandKind::DateBefore => {
                let [date] = exactly::<1>(name, &self.arguments)?;
                Ok(Command::Archive(ArchiveFilter::DateBefore(parse_date(
                    name, date,
                )?)))
            }
            CommandKind::DateAfter => {
                let [date] = exactly::<1>(name, &self.arguments)?;
                Ok(Command::Archive(ArchiveFilter::DateAfter(parse_date(
                    name, date,
                )?)))
            }
            CommandKind::Quit => {
                exactly::<0>(name, &self.arguments)?;
                Ok(Command::Quit)
            }
        }
    }
}

fn exactly<'a, const N: usize>(
    name: &'static str,
    arguments: &'a [String],
) -> Result<&'a [String; N], DispatchError> {
    arguments.try_into().map_err(|_| {
        DispatchError::invalid_syntax(
            name,
            format!("expected {N} argument(s), got {}", arguments.len()),
        )
    })
}

fn parse_size(name: &'static str, value: &str) -> Result<u64, DispatchError> {
    if !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(DispatchError::invalid_syntax(
            name,
            format!("'{value}' is not a non-negative integer"),
        ));
    }
    value
        .parse()
        .map_err(|_| DispatchError::invalid_syntax(name, format!("'{value}' is out of range")))
}

fn parse_date(name: &'static str, value: &str) -> Result<time::OffsetDateTime, DispatchError> {
    ArchiveFilter::parse_threshold(value)
        .ok_or_else(|| DispatchError::invalid_syntax(name, format!("'{value}' is not YYYY-MM-DD")))
}
