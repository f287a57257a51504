//! Line command interpreter over a [`FileStorage`].
//!
//! Every command that mutates the store persists it before returning.
//! Problems are reported as one-line diagnostics on the output; the loop
//! itself only stops on `quit`, `EOF` or end of input.

mod command;

pub use command::{tokenize, Command};

use std::io::{self, BufRead, Write};

use log::{debug, error};
use serde_json::Value;

use crate::error::{CommandError, HbnbError, HbnbResult, ModelError};
use crate::model::storage_key;
use crate::storage::FileStorage;

/// Prompt printed before each line in interactive mode.
pub const PROMPT: &str = "(hbnb) ";

const HELP_TOPICS: [(&str, &str); 8] = [
    ("EOF", "Exit the program on end of input."),
    (
        "all",
        "Prints all string representations of all instances, optionally filtered by class \
         name.\nUsage: all [<class name>]",
    ),
    (
        "create",
        "Creates a new instance, saves it, and prints its id.\nUsage: create <class name>",
    ),
    ("destroy", "Deletes an instance based on the class name and id.\nUsage: destroy <class name> <id>"),
    ("help", "List available commands, or describe one.\nUsage: help [<command>]"),
    ("quit", "Quit command to exit the program."),
    ("show", "Prints the string representation of an instance.\nUsage: show <class name> <id>"),
    (
        "update",
        "Updates an instance by adding or updating an attribute.\nUsage: update <class name> \
         <id> <attribute name> \"<attribute value>\"",
    ),
];

/// Whether the read loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop the loop.
    Quit,
}

/// The command interpreter.
///
/// Owns the store and writes all user-facing output to `out`.
pub struct Console<W: Write> {
    storage: FileStorage,
    out: W,
}

impl<W: Write> Console<W> {
    /// Creates an interpreter over an already reloaded store.
    #[must_use]
    pub fn new(storage: FileStorage, out: W) -> Self {
        Self { storage, out }
    }

    /// The underlying store.
    #[must_use]
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Consumes the interpreter, returning the store and the output sink.
    #[must_use]
    pub fn into_parts(self) -> (FileStorage, W) {
        (self.storage, self.out)
    }

    /// Reads and executes lines until `quit`, `EOF`, or end of input.
    ///
    /// When `interactive` is set, [`PROMPT`] is printed before each line.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from reading `input` or writing output.
    pub fn run<R: BufRead>(&mut self, mut input: R, interactive: bool) -> io::Result<()> {
        let mut line = String::new();
        loop {
            if interactive {
                write!(self.out, "{PROMPT}")?;
                self.out.flush()?;
            }
            line.clear();
            let flow = if input.read_line(&mut line)? == 0 {
                self.execute("EOF")?
            } else {
                self.execute(&line)?
            };
            if flow == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Executes a single line, writing its output.
    ///
    /// # Errors
    ///
    /// Returns I/O errors from writing output. Command failures are not
    /// errors; they are printed.
    pub fn execute(&mut self, line: &str) -> io::Result<Flow> {
        let command = Command::parse(line);
        debug!("execute {command:?}");

        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Eof => {
                writeln!(self.out)?;
                return Ok(Flow::Quit);
            }
            Command::Empty => return Ok(Flow::Continue),
            _ => {}
        }

        match self.dispatch(command) {
            Ok(Some(output)) => writeln!(self.out, "{output}")?,
            Ok(None) => {}
            Err(HbnbError::Command(e)) => writeln!(self.out, "{e}")?,
            Err(HbnbError::Model(ModelError::ReservedAttribute { .. })) => {
                writeln!(self.out, "{}", CommandError::ReservedAttribute)?;
            }
            Err(HbnbError::Storage(e)) => {
                error!("command failed: {e}");
                writeln!(self.out, "** storage error: {e} **")?;
            }
            Err(HbnbError::Model(e)) => {
                error!("command failed: {e}");
                writeln!(self.out, "** {e} **")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn dispatch(&mut self, command: Command) -> HbnbResult<Option<String>> {
        match command {
            Command::Create { class } => self.create(class),
            Command::Show { class, id } => {
                let key = self.existing_key(class, id)?;
                Ok(self.storage.get(&key).map(ToString::to_string))
            }
            Command::Destroy { class, id } => {
                let key = self.existing_key(class, id)?;
                let removed = self.storage.remove(&key);
                if let Err(e) = self.storage.save() {
                    // Memory must keep matching the file that was not rewritten.
                    if let Some(model) = removed {
                        self.storage.all_mut().insert(key, model);
                    }
                    return Err(e.into());
                }
                Ok(None)
            }
            Command::All { class } => self.all(class.as_deref()).map(Some),
            Command::Update {
                class,
                id,
                attribute,
                value,
            } => self.update(class, id, attribute, value),
            Command::Help { topic } => Ok(Some(help(topic.as_deref()))),
            Command::Unknown(line) => Err(CommandError::UnknownSyntax { line }.into()),
            Command::Quit | Command::Eof | Command::Empty => Ok(None),
        }
    }

    fn create(&mut self, class: Option<String>) -> HbnbResult<Option<String>> {
        let class = class.ok_or(CommandError::MissingClassName)?;
        let model = self
            .storage
            .classes()
            .resolve(&class)
            .ok_or(CommandError::UnknownType)?
            .instantiate();
        let id = model.id().to_string();
        self.storage.add(model);
        self.storage.save()?;
        Ok(Some(id))
    }

    fn all(&self, class: Option<&str>) -> HbnbResult<String> {
        if let Some(class) = class {
            if !self.storage.classes().contains(class) {
                return Err(CommandError::UnknownType.into());
            }
        }
        let rendered: Vec<String> = self
            .storage
            .all()
            .values()
            .filter(|model| class.map_or(true, |c| model.class_name() == c))
            .map(|model| format!("\"{}\"", model.to_string().replace('"', "\\\"")))
            .collect();
        Ok(format!("[{}]", rendered.join(", ")))
    }

    fn update(
        &mut self,
        class: Option<String>,
        id: Option<String>,
        attribute: Option<String>,
        value: Option<String>,
    ) -> HbnbResult<Option<String>> {
        let key = self.existing_key(class, id)?;
        let attribute = attribute.ok_or(CommandError::MissingAttribute)?;
        let value = value.ok_or(CommandError::MissingValue)?;

        if let Some(model) = self.storage.get_mut(&key) {
            model.set_attribute(attribute, Value::String(value))?;
        }
        self.storage.touch(&key)?;
        Ok(None)
    }

    /// Validates `<class> <id>` and returns the storage key of an existing
    /// instance.
    fn existing_key(
        &self,
        class: Option<String>,
        id: Option<String>,
    ) -> Result<String, CommandError> {
        let class = class.ok_or(CommandError::MissingClassName)?;
        if !self.storage.classes().contains(&class) {
            return Err(CommandError::UnknownType);
        }
        let id = id.ok_or(CommandError::MissingId)?;
        let key = storage_key(&class, &id);
        if self.storage.get(&key).is_none() {
            return Err(CommandError::NotFound);
        }
        Ok(key)
    }
}

fn help(topic: Option<&str>) -> String {
    match topic {
        None => {
            let names: Vec<&str> = HELP_TOPICS.iter().map(|(name, _)| *name).collect();
            format!(
                "Documented commands (type help <topic>):\n{}\n{}",
                "=".repeat(40),
                names.join("  ")
            )
        }
        Some(topic) => HELP_TOPICS
            .iter()
            .find(|(name, _)| *name == topic)
            .map_or_else(|| format!("*** No help on {topic}"), |(_, text)| (*text).to_string()),
    }
}
