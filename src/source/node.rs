/// One XML element with namespace-stripped names
///
/// `text` holds the character data that appeared before the first child
/// element, verbatim. The CM walkers branch on embedded line breaks in that
/// text to tell structured containers apart from scalar leaves, so it must
/// not be trimmed here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNode {
    /// Local element name (`{ns}tag` and `prefix:tag` both become `tag`)
    pub tag: String,

    /// Attributes in document order, keys reduced to their local name
    pub attrs: Vec<(String, String)>,

    /// Character data before the first child element, if any
    pub text: Option<String>,

    /// Child elements in document order
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn new(tag: impl Into<String>) -> Self {
        RawNode {
            tag: tag.into(),
            ..RawNode::default()
        }
    }

    /// Look up an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First descendant with the given tag, depth-first document order
    pub fn find(&self, tag: &str) -> Option<&RawNode> {
        for child in &self.children {
            if child.tag == tag {
                return Some(child);
            }
            if let Some(found) = child.find(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant with the given tag, depth-first document order
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a RawNode> {
        let mut out = Vec::new();
        self.collect_all(tag, &mut out);
        out
    }

    fn collect_all<'a>(&'a self, tag: &str, out: &mut Vec<&'a RawNode>) {
        for child in &self.children {
            if child.tag == tag {
                out.push(child);
            }
            child.collect_all(tag, out);
        }
    }

    /// Direct children with the given tag
    pub fn children_with_tag<'a>(&'a self, tag: &str) -> impl Iterator<Item = &'a RawNode> {
        let tag = tag.to_owned();
        self.children.iter().filter(move |child| child.tag == tag)
    }
}
