//! Line-oriented request dispatch.
//!
//! Each accepted connection is served by a [`ConnectionWorker`] that reads
//! newline-terminated requests, parses them into typed [`Command`]s and routes
//! them to the query components through the [`CommandRouter`].
//!
//! ## Protocol
//!
//! ```text
//! dirlist -a|-t          names of root subdirectories, one per line
//! w24fn <file>           metadata block for one root file
//! w24fz <min> <max>      archive of files sized within [min, max]
//! w24ft <ext> [ext] [ext] archive of files with a listed extension
//! w24fdb <YYYY-MM-DD>    archive of files created on or before the date
//! w24fda <YYYY-MM-DD>    archive of files created on or after the date
//! quitc                  confirmation, then the connection closes
//! ```
//!
//! Every response is a single newline-terminated text write. Rejections use
//! fixed texts such as `Invalid command` and never close the connection.

mod errors;
mod request;
mod response;
mod router;
mod worker;

pub use self::errors::DispatchError;
pub use self::request::{Command, CommandKind, CommandRequest};
pub use self::response::ResponseWriter;
pub use self::router::{CommandRouter, DispatchOutcome};
pub use self::worker::ConnectionWorker;
