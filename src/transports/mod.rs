//! Built-in transports

pub mod batch;
pub mod callback;
pub mod console;
pub mod file;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;
pub mod multi;
pub mod null;
pub mod stream;

pub use batch::{BatchSender, BatchTransport};
pub use callback::CallbackTransport;
pub use console::ConsoleTransport;
pub use file::FileTransport;
#[cfg(feature = "http")]
pub use http::{HttpSender, HttpSenderBuilder, HttpTransport, DEFAULT_HTTP_TIMEOUT};
pub use memory::{MemoryTransport, DEFAULT_MEMORY_CAPACITY};
pub use multi::MultiTransport;
pub use null::NullTransport;
pub use stream::StreamTransport;
