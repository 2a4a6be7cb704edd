//! Rendered nodes and the container they are placed in

use std::collections::VecDeque;

use crate::entry::{EntryId, LogEntry, LogStream};

/// An entry rendered through the stream's fixed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedNode {
    /// Chat row: avatar, author, body bubble and time
    Chat {
        id: EntryId,
        avatar_src: String,
        author: String,
        body: String,
        time: String,
    },
    /// Server log row: `[time]text`
    Common { id: EntryId, line: String },
}

impl RenderedNode {
    pub fn render(stream: LogStream, entry: &LogEntry) -> Self {
        match stream {
            LogStream::Chat => RenderedNode::Chat {
                id: entry.id,
                avatar_src: entry.avatar_src(),
                author: entry.author.clone().unwrap_or_default(),
                body: entry.text.clone(),
                time: entry.timestamp.clone(),
            },
            LogStream::Common => RenderedNode::Common {
                id: entry.id,
                line: format!("[{}]{}", entry.timestamp, entry.text),
            },
        }
    }

    pub fn id(&self) -> EntryId {
        match self {
            RenderedNode::Chat { id, .. } | RenderedNode::Common { id, .. } => *id,
        }
    }
}

/// A container of rendered nodes
///
/// The panel only ever appends, prepends and asks for the id of the last node.
pub trait LogView {
    fn append(&mut self, node: RenderedNode);

    fn prepend(&mut self, node: RenderedNode);

    /// Id of the last node in the container
    fn last_rendered_id(&self) -> Option<EntryId>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory container used by the session and the desktop viewer
#[derive(Debug, Clone, Default)]
pub struct RenderedLog {
    nodes: VecDeque<RenderedNode>,
}

impl RenderedLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RenderedNode> {
        self.nodes.iter()
    }

    /// Copy of the container, first node first
    pub fn snapshot(&self) -> Vec<RenderedNode> {
        self.nodes.iter().cloned().collect()
    }

    pub fn ids(&self) -> Vec<EntryId> {
        self.nodes.iter().map(RenderedNode::id).collect()
    }
}

impl LogView for RenderedLog {
    fn append(&mut self, node: RenderedNode) {
        self.nodes.push_back(node);
    }

    fn prepend(&mut self, node: RenderedNode) {
        self.nodes.push_front(node);
    }

    fn last_rendered_id(&self) -> Option<EntryId> {
        self.nodes.back().map(RenderedNode::id)
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
