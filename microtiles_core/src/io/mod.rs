mod value_writer;
mod value_writer_blob;

pub use value_writer::ValueWriter;
pub use value_writer_blob::ValueWriterBlob;
