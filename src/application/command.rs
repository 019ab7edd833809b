use crate::error::{PaymentError, Result};

/// A command after tokenizing: its name and its positional arguments,
/// comments already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// The argument at `index`, if it was supplied.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Create,
    Authorize,
    Capture,
    Void,
    Refund,
    Settle,
    Settlement,
    Status,
    List,
    Audit,
    Exit,
}

impl CommandKind {
    pub const ALL: [CommandKind; 11] = [
        CommandKind::Create,
        CommandKind::Authorize,
        CommandKind::Capture,
        CommandKind::Void,
        CommandKind::Refund,
        CommandKind::Settle,
        CommandKind::Settlement,
        CommandKind::Status,
        CommandKind::List,
        CommandKind::Audit,
        CommandKind::Exit,
    ];

    /// Looks up a command by its exact (upper-case) name.
    pub fn from_name(name: &str) -> Result<Self> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| PaymentError::UnknownCommand {
                name: name.to_string(),
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Create => "CREATE",
            CommandKind::Authorize => "AUTHORIZE",
            CommandKind::Capture => "CAPTURE",
            CommandKind::Void => "VOID",
            CommandKind::Refund => "REFUND",
            CommandKind::Settle => "SETTLE",
            CommandKind::Settlement => "SETTLEMENT",
            CommandKind::Status => "STATUS",
            CommandKind::List => "LIST",
            CommandKind::Audit => "AUDIT",
            CommandKind::Exit => "EXIT",
        }
    }

    /// Number of arguments that must be present. Optional ones (the VOID
    /// reason, the REFUND amount) are not counted.
    pub fn required_args(&self) -> usize {
        match self {
            CommandKind::Create => 4,
            CommandKind::List | CommandKind::Exit => 0,
            _ => 1,
        }
    }

    pub fn check_args(&self, got: usize) -> Result<()> {
        let expected = self.required_args();
        if got < expected {
            return Err(PaymentError::InsufficientArguments {
                command: self.name().to_string(),
                expected,
                got,
            });
        }
        Ok(())
    }
}
