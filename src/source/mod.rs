//! Source reading - load vendor XML exports into traversable trees
//!
//! Every vendor adapter starts here: `read_document` opens a file
//! (decompressing gzip transparently), parses it with quick-xml, and hands
//! back an owned [`RawNode`] tree with namespace-stripped names. The
//! flattening walkers never touch the filesystem or the XML parser
//! themselves.

pub mod node;
pub mod reader;

pub use node::RawNode;
pub use reader::read_document;
