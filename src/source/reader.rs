use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ConvertError, Result};
use crate::source::RawNode;

/// Load a vendor export into a [`RawNode`] tree
///
/// Paths ending in a literal `.gz` are decompressed on the fly; everything
/// else is read as-is (no content sniffing). Open failures and malformed
/// XML both surface as [`ConvertError::SourceUnreadable`] carrying the
/// underlying error text. The file handle lives only for the duration of
/// the parse.
pub fn read_document(path: &Path) -> Result<RawNode> {
    let file = File::open(path).map_err(|err| source_err(path, err))?;
    debug!("reading {}", path.display());

    if path.extension().is_some_and(|ext| ext == "gz") {
        parse_tree(BufReader::new(GzDecoder::new(file)), path)
    } else {
        parse_tree(BufReader::new(file), path)
    }
}

fn source_err(path: &Path, err: impl std::fmt::Display) -> ConvertError {
    ConvertError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

fn parse_tree<R: BufRead>(reader: R, path: &Path) -> Result<RawNode> {
    let mut xml = Reader::from_reader(reader);
    let mut stack: Vec<RawNode> = Vec::new();
    let mut root: Option<RawNode> = None;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                let node = node_from_start(&start, path)?;
                stack.push(node);
            }
            Ok(Event::Empty(start)) => {
                let node = node_from_start(&start, path)?;
                attach(node, &mut stack, &mut root, path)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| source_err(path, "unexpected closing tag"))?;
                attach(node, &mut stack, &mut root, path)?;
            }
            Ok(Event::Text(text)) => {
                if let Some(open) = stack.last_mut() {
                    // Only text before the first child element counts.
                    if open.children.is_empty() {
                        let chunk = text.unescape().map_err(|err| source_err(path, err))?;
                        open.text.get_or_insert_with(String::new).push_str(&chunk);
                    }
                }
            }
            Ok(Event::CData(cdata)) => {
                if let Some(open) = stack.last_mut() {
                    if open.children.is_empty() {
                        let chunk = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                        open.text.get_or_insert_with(String::new).push_str(&chunk);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(source_err(path, err)),
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(source_err(path, "unexpected end of document"));
    }
    root.ok_or_else(|| source_err(path, "document has no root element"))
}

fn node_from_start(start: &BytesStart, path: &Path) -> Result<RawNode> {
    let tag = String::from_utf8_lossy(start.name().local_name().as_ref()).into_owned();
    let mut node = RawNode::new(tag);

    for attr in start.attributes() {
        let attr = attr.map_err(|err| source_err(path, err))?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| source_err(path, err))?
            .into_owned();
        node.attrs.push((key, value));
    }
    Ok(node)
}

fn attach(
    node: RawNode,
    stack: &mut Vec<RawNode>,
    root: &mut Option<RawNode>,
    path: &Path,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_some() {
                return Err(source_err(path, "multiple root elements"));
            }
            *root = Some(node);
        }
    }
    Ok(())
}

/// Parse an in-memory document, for fixtures in unit tests
#[cfg(test)]
pub(crate) fn read_str(xml: &str) -> Result<RawNode> {
    parse_tree(xml.as_bytes(), Path::new("<inline>"))
}
