//! Collaborators the engine talks to: where output goes and where files live

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;

/// Receives everything a statement prints
pub trait Sink {
    /// One line of output, without the trailing newline
    fn write_line(&mut self, line: &str);

    /// The `clear` command was evaluated
    fn clear_screen(&mut self) {}

    /// The `quit` command was evaluated
    fn quit(&mut self) {}
}

/// Collects lines in memory; clear and quit are recorded as markers
impl Sink for Vec<String> {
    fn write_line(&mut self, line: &str) {
        self.push(line.to_string());
    }

    fn clear_screen(&mut self) {
        self.push("<clear>".to_string());
    }

    fn quit(&mut self) {
        self.push("<quit>".to_string());
    }
}

/// Whole-file access used by load, save and run
pub trait FileSystem {
    fn read_to_string(&self, path: &str) -> io::Result<String>;
    fn write(&self, path: &str, contents: &str) -> io::Result<()>;
}

/// The real file system, paths relative to the working directory
#[derive(Debug, Default)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &str, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }
}

/// Files kept in memory, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RefCell<HashMap<String, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, contents: &str) -> Self {
        self.files
            .borrow_mut()
            .insert(path.to_string(), contents.to_string());
        self
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        self.contents(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{path} (No such file)"))
        })
    }

    fn write(&self, path: &str, contents: &str) -> io::Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_string(), contents.to_string());
        Ok(())
    }
}

impl<T: FileSystem + ?Sized> FileSystem for std::rc::Rc<T> {
    fn read_to_string(&self, path: &str) -> io::Result<String> {
        (**self).read_to_string(path)
    }

    fn write(&self, path: &str, contents: &str) -> io::Result<()> {
        (**self).write(path, contents)
    }
}
