use std::collections::BTreeMap;
use std::fmt;

/// Handle to an element inside a [`Page`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A single element of the page tree
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    style_width: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// One compound part of a selector, e.g. `tr.row[data-download-id="x"]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

/// Element selector: a chain of compounds joined by the descendant combinator.
///
/// Built with constructors rather than parsed, e.g.
/// `Selector::class("progress__nums").descendant(Selector::class("js-rec"))`
/// selects what `.progress__nums .js-rec` would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    chain: Vec<Compound>,
}

impl Selector {
    fn single(compound: Compound) -> Self {
        Self {
            chain: vec![compound],
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self::single(Compound {
            tag: Some(tag.into()),
            ..Compound::default()
        })
    }

    pub fn class(class: impl Into<String>) -> Self {
        Self::single(Compound {
            classes: vec![class.into()],
            ..Compound::default()
        })
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::single(Compound {
            id: Some(id.into()),
            ..Compound::default()
        })
    }

    pub fn attr(name: impl Into<String>) -> Self {
        Self::single(Compound {
            attrs: vec![(name.into(), None)],
            ..Compound::default()
        })
    }

    fn subject_mut(&mut self) -> &mut Compound {
        // chain is never empty: every constructor pushes one compound
        let last = self.chain.len() - 1;
        &mut self.chain[last]
    }

    pub fn and_class(mut self, class: impl Into<String>) -> Self {
        self.subject_mut().classes.push(class.into());
        self
    }

    pub fn and_attr(mut self, name: impl Into<String>) -> Self {
        self.subject_mut().attrs.push((name.into(), None));
        self
    }

    pub fn and_attr_eq(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.subject_mut()
            .attrs
            .push((name.into(), Some(value.into())));
        self
    }

    /// Select elements matching `inner` that have an ancestor matching `self`
    pub fn descendant(mut self, inner: Selector) -> Self {
        self.chain.extend(inner.chain);
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, compound) in self.chain.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if let Some(tag) = &compound.tag {
                write!(f, "{}", tag)?;
            }
            if let Some(id) = &compound.id {
                write!(f, "#{}", id)?;
            }
            for class in &compound.classes {
                write!(f, ".{}", class)?;
            }
            for (name, value) in &compound.attrs {
                match value {
                    Some(v) => write!(f, "[{}=\"{}\"]", name, v)?,
                    None => write!(f, "[{}]", name)?,
                }
            }
        }
        Ok(())
    }
}

/// In-memory document: an arena of elements rooted at `html`, with a `body`.
///
/// Every write goes through `&mut self`. Writes that change the tree bump a
/// mutation counter; rewriting a value with itself does not.
#[derive(Debug, Clone)]
pub struct Page {
    nodes: Vec<Element>,
    root: NodeId,
    body: NodeId,
    mutations: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        let mut page = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            mutations: 0,
        };
        page.root = page.create_element("html");
        page.body = page.create_element("body");
        page.append_child(page.root, page.body);
        page.mutations = 0;
        page
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Number of write operations applied since the page was created
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    /// Apply `edit` to an element; the mutation counter only moves when the
    /// edit reports a change
    fn edit<R>(&mut self, id: NodeId, edit: impl FnOnce(&mut Element) -> (R, bool)) -> Option<R> {
        let element = self.nodes.get_mut(id.0)?;
        let (result, changed) = edit(element);
        if changed {
            self.mutations += 1;
        }
        Some(result)
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element {
            tag: tag.into(),
            ..Element::default()
        });
        self.mutations += 1;
        id
    }

    /// Attach `child` as the last child of `parent`, detaching it first if needed
    ///
    /// Returns false when the append would put `child` inside its own subtree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.element(parent).is_none() || self.element(child).is_none() {
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            return false;
        }
        self.remove(child);
        self.edit(child, |el| {
            el.parent = Some(parent);
            ((), true)
        });
        self.edit(parent, |el| {
            el.children.push(child);
            ((), true)
        });
        true
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Detach an element (and its subtree) from the tree.
    ///
    /// Returns false when the element was already detached.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.element(id).and_then(|el| el.parent) else {
            return false;
        };
        self.edit(parent, |el| {
            el.children.retain(|c| *c != id);
            ((), true)
        });
        self.edit(id, |el| {
            el.parent = None;
            ((), true)
        });
        true
    }

    /// True when the element is reachable from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_ancestor_or_self(self.root, id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).and_then(|el| el.parent)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|el| el.attrs.get(name))
            .map(String::as_str)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        self.edit(id, |el| {
            if el.attrs.get(&name) == Some(&value) {
                return ((), false);
            }
            el.attrs.insert(name, value);
            ((), true)
        });
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        self.edit(id, |el| {
            let removed = el.attrs.remove(name).is_some();
            (removed, removed)
        })
        .unwrap_or(false)
    }

    pub fn classes(&self, id: NodeId) -> &[String] {
        self.element(id).map(|el| el.classes.as_slice()).unwrap_or(&[])
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        self.edit(id, |el| {
            if el.classes.iter().any(|c| c == class) {
                return ((), false);
            }
            el.classes.push(class.to_string());
            ((), true)
        });
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.edit(id, |el| {
            let before = el.classes.len();
            el.classes.retain(|c| c != class);
            ((), el.classes.len() != before)
        });
    }

    /// Add the class when `force` is true, remove it otherwise
    pub fn toggle_class(&mut self, id: NodeId, class: &str, force: bool) {
        if force {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    pub fn text(&self, id: NodeId) -> &str {
        self.element(id).map(|el| el.text.as_str()).unwrap_or("")
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        let text = text.into();
        self.edit(id, |el| {
            if el.text == text {
                return ((), false);
            }
            el.text = text;
            ((), true)
        });
    }

    pub fn style_width(&self, id: NodeId) -> Option<&str> {
        self.element(id).and_then(|el| el.style_width.as_deref())
    }

    pub fn set_style_width(&mut self, id: NodeId, width: impl Into<String>) {
        let width = width.into();
        self.edit(id, |el| {
            if el.style_width.as_deref() == Some(width.as_str()) {
                return ((), false);
            }
            el.style_width = Some(width);
            ((), true)
        });
    }

    fn matches_compound(&self, id: NodeId, compound: &Compound) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if let Some(tag) = &compound.tag {
            if !el.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(wanted) = &compound.id {
            if el.attrs.get("id") != Some(wanted) {
                return false;
            }
        }
        if !compound
            .classes
            .iter()
            .all(|class| el.classes.iter().any(|c| c == class))
        {
            return false;
        }
        compound.attrs.iter().all(|(name, value)| match value {
            Some(v) => el.attrs.get(name) == Some(v),
            None => el.attrs.contains_key(name),
        })
    }

    /// True when the element matches the selector (ancestors are walked for
    /// the descendant parts of the chain)
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let Some((subject, ancestors)) = selector.chain.split_last() else {
            return false;
        };
        if !self.matches_compound(id, subject) {
            return false;
        }

        let mut cursor = self.parent(id);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(node) = cursor else {
                    return false;
                };
                cursor = self.parent(node);
                if self.matches_compound(node, compound) {
                    break;
                }
            }
        }
        true
    }

    /// The element itself or its nearest ancestor matching the selector
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.matches(node, selector) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .element(scope)
            .map(|el| el.children.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(el) = self.element(node) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    /// First descendant of `scope` (document order) matching the selector
    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|node| self.matches(*node, selector))
    }

    /// All descendants of `scope` (document order) matching the selector
    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }

    /// Document-wide lookup by `id` attribute
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query(self.root, &Selector::id(id))
    }
}
