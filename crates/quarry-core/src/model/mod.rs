pub mod document;
pub mod notebook;
pub mod snippet;

pub use document::{Document, NotebookRef};
pub use notebook::{Notebook, NotebookStatus};
pub use snippet::{split_statements, ResultHandle, Snippet, SnippetResult};
