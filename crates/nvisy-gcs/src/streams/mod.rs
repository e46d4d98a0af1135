//! Streaming object transfers.

mod object_reader;
mod object_writer;

pub use object_reader::ObjectReadStream;
pub use object_writer::ObjectWriter;
