use unicode_segmentation::UnicodeSegmentation;

use crate::tunnel::{Tunnel, TunnelKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuCommand {
    ManageTunnels,
    ImportTunnels,
    About,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Status {
        title: String,
    },
    Networks {
        title: String,
        hidden: bool,
    },
    Separator,
    Tunnel {
        title: String,
        checked: bool,
        key: TunnelKey,
    },
    Command {
        title: String,
        command: MenuCommand,
    },
}

impl MenuItem {
    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Separator)
    }

    pub fn tunnel_key(&self) -> Option<TunnelKey> {
        match self {
            Self::Tunnel { key, .. } => Some(*key),
            _ => None,
        }
    }
}

/// One edit to the rendered menu, at an absolute menu position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuChange {
    Insert { position: usize, item: MenuItem },
    Remove { position: usize },
    Update { position: usize, item: MenuItem },
}

impl MenuChange {
    /// Applies the change to a presenter-side copy of the menu.
    pub fn apply(self, items: &mut Vec<MenuItem>) {
        match self {
            Self::Insert { position, item } => items.insert(position, item),
            Self::Remove { position } => {
                items.remove(position);
            }
            Self::Update { position, item } => items[position] = item,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowRendering {
    pub max_title_graphemes: Option<usize>,
}

impl RowRendering {
    /// Title and checkmark state of a tunnel row.
    pub fn render(&self, tunnel: &Tunnel) -> (String, bool) {
        (
            truncate_title(tunnel.name(), self.max_title_graphemes),
            tunnel.status().shows_checkmark(),
        )
    }
}

fn truncate_title(name: &str, max_graphemes: Option<usize>) -> String {
    let Some(max_graphemes) = max_graphemes.filter(|max| *max > 0) else {
        return name.to_string();
    };
    let graphemes: Vec<&str> = name.graphemes(true).collect();
    if graphemes.len() <= max_graphemes {
        return name.to_string();
    }
    let mut title = graphemes[..max_graphemes - 1].concat();
    title.push('…');
    title
}
