//! The interactive menu: read a numbered choice, read a key if the choice needs one, run it
//! against a [`Tree`] and print the tree level by level with each node's balance factor.
//!
//! # Examples
//!
//! ```
//! use avl::menu::{Menu, MenuConfig};
//!
//! let input = "1\n10\n1\n20\n1\n30\n4\n";
//! let mut output = Vec::new();
//! let config = MenuConfig {
//!     show_prompts: false,
//!     ..MenuConfig::default()
//! };
//!
//! let mut menu = Menu::new(input.as_bytes(), &mut output, config);
//! menu.run().unwrap();
//!
//! assert_eq!(menu.tree().level_order()[0], vec![(&20, 0)]);
//! ```

use std::io::{self, BufRead, Write};
use std::num::ParseIntError;
use std::ops::ControlFlow;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::tree::{Duplicates, Tree};

/// The type of key read from the user.
pub type Key = i64;

/// Errors raised while running the menu.
#[derive(Error, Debug)]
pub enum MenuError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The user typed something that isn't a key.
    #[error("Invalid value {input:?}: expected an integer.")]
    InvalidKey {
        /// What the user typed, trimmed.
        input: String,
        /// Why it didn't parse.
        #[source]
        source: ParseIntError,
    },
}

impl MenuError {
    /// Whether the menu can report this to the user and carry on.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MenuError::InvalidKey { .. } => true,
            MenuError::Io(_) => false,
        }
    }
}

/// One of the numbered menu entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    /// `1`: insert a key.
    Insert,
    /// `2`: delete a key.
    Delete,
    /// `3`: print the tree.
    Print,
    /// `4`: leave the menu.
    Exit,
}

impl Choice {
    /// Parses a menu selector. Surrounding whitespace is ignored.
    ///
    /// ```
    /// use avl::menu::Choice;
    ///
    /// assert_eq!(Choice::parse(" 2 "), Some(Choice::Delete));
    /// assert_eq!(Choice::parse("5"), None);
    /// ```
    pub fn parse(selector: &str) -> Option<Self> {
        match selector.trim() {
            "1" => Some(Self::Insert),
            "2" => Some(Self::Delete),
            "3" => Some(Self::Print),
            "4" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Settings for a [`Menu`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuConfig {
    /// Print the list of choices and the "Enter a value" prompts. Results are always printed.
    pub show_prompts: bool,
    /// How the menu's tree treats a key it already holds.
    pub duplicates: Duplicates,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            show_prompts: true,
            duplicates: Duplicates::Allow,
        }
    }
}

const MENU: &str = "\nAVL Tree Operations:\n\
                    1. Insert\n\
                    2. Delete\n\
                    3. Print Tree with Balance Factors\n\
                    4. Exit\n";

/// Runs the menu loop over any line based input and any output.
pub struct Menu<R, W> {
    input: R,
    output: W,
    config: MenuConfig,
    tree: Tree<Key>,
}

impl<R, W> Menu<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Creates a menu with an empty tree.
    pub fn new(input: R, output: W, config: MenuConfig) -> Self {
        Self {
            input,
            output,
            config,
            tree: Tree::with_duplicates(config.duplicates),
        }
    }

    /// The tree the menu has built so far.
    pub fn tree(&self) -> &Tree<Key> {
        &self.tree
    }

    /// Runs until the user picks [`Choice::Exit`] or the input runs out. Bad choices and bad keys
    /// are reported to the user and the loop carries on. I/O errors end it.
    pub fn run(&mut self) -> Result<(), MenuError> {
        info!(duplicates = ?self.tree.duplicates(), "menu started");
        loop {
            match self.step() {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(err) if err.is_recoverable() => {
                    warn!(%err, "rejected input");
                    writeln!(self.output, "{}", err)?;
                }
                Err(err) => return Err(err),
            }
        }

        self.output.flush()?;
        Ok(())
    }

    /// Shows the menu once and handles the user's choice.
    fn step(&mut self) -> Result<ControlFlow<()>, MenuError> {
        if self.config.show_prompts {
            write!(self.output, "{}", MENU)?;
        }
        let Some(selector) = self.prompt("Enter your choice: ")? else {
            debug!("end of input");
            return Ok(ControlFlow::Break(()));
        };

        match Choice::parse(&selector) {
            Some(Choice::Insert) => {
                let Some(key) = self.prompt_key("Enter a value to insert: ")? else {
                    return Ok(ControlFlow::Break(()));
                };
                let inserted = self.tree.insert(key);
                debug!(key, inserted, len = self.tree.len(), "insert");
                writeln!(self.output, "Inserted: {}", key)?;
                self.print_tree()?;
            }
            Some(Choice::Delete) => {
                let Some(key) = self.prompt_key("Enter a value to delete: ")? else {
                    return Ok(ControlFlow::Break(()));
                };
                let deleted = self.tree.delete(&key).is_some();
                debug!(key, deleted, len = self.tree.len(), "delete");
                writeln!(self.output, "Deleted: {}", key)?;
                self.print_tree()?;
            }
            Some(Choice::Print) => {
                writeln!(self.output, "AVL Tree with Balance Factors:")?;
                self.print_tree()?;
            }
            Some(Choice::Exit) => {
                info!(len = self.tree.len(), height = self.tree.height(), "exiting");
                writeln!(self.output, "Exiting...")?;
                return Ok(ControlFlow::Break(()));
            }
            None => {
                warn!(selector = %selector, "invalid menu choice");
                writeln!(self.output, "Invalid choice. Please try again.")?;
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn print_tree(&mut self) -> Result<(), MenuError> {
        write!(self.output, "{}", self.tree)?;
        Ok(())
    }

    /// Prints `prompt` (unless prompts are off) and reads a trimmed line. `None` means the input
    /// ran out.
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>, MenuError> {
        if self.config.show_prompts {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
        }

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn prompt_key(&mut self, prompt: &str) -> Result<Option<Key>, MenuError> {
        let Some(input) = self.prompt(prompt)? else {
            return Ok(None);
        };
        input
            .parse::<Key>()
            .map(Some)
            .map_err(|source| MenuError::InvalidKey { input, source })
    }
}
