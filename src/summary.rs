use crate::{
    menu_item::MenuItem,
    strings::Strings,
    tunnel::{Tunnel, TunnelStatus},
};

/// The two summary rows at the top of the menu.
///
/// Holds nothing but the rendered lines. Whichever qualifying tunnel
/// reported last decides what they say.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryProjector {
    status_title: String,
    networks_title: String,
    networks_hidden: bool,
}

impl SummaryProjector {
    pub fn new(strings: &Strings) -> Self {
        Self {
            status_title: status_title(TunnelStatus::Inactive, strings),
            networks_title: strings.translate("menu.networks_none"),
            networks_hidden: true,
        }
    }

    /// Re-renders the summary from `tunnel`. Returns whether anything was
    /// rendered: `waiting` tunnels never are, `inactive` ones only when
    /// `ignore_inactive_status` is false.
    pub fn update(
        &mut self,
        tunnel: &Tunnel,
        ignore_inactive_status: bool,
        strings: &Strings,
    ) -> bool {
        let status = tunnel.status();
        match status {
            TunnelStatus::Waiting => return false,
            TunnelStatus::Inactive if ignore_inactive_status => return false,
            TunnelStatus::Inactive => {
                self.networks_title = strings.translate("menu.networks_none");
                self.networks_hidden = true;
            }
            _ => {
                self.networks_title = networks_title(tunnel.addresses(), strings);
                self.networks_hidden = false;
            }
        }
        self.status_title = status_title(status, strings);
        log::debug!(
            "[summary] {:?} ({status}): {} / {}",
            tunnel.name(),
            self.status_title,
            self.networks_title
        );
        true
    }

    pub fn status_title(&self) -> &str {
        &self.status_title
    }

    pub fn networks_title(&self) -> &str {
        &self.networks_title
    }

    pub fn status_item(&self) -> MenuItem {
        MenuItem::Status {
            title: self.status_title.clone(),
        }
    }

    pub fn networks_item(&self) -> MenuItem {
        MenuItem::Networks {
            title: self.networks_title.clone(),
            hidden: self.networks_hidden,
        }
    }
}

fn status_title(status: TunnelStatus, strings: &Strings) -> String {
    let phrase = strings.translate(status.localization_key());
    strings.translate_with("menu.status", &[&phrase])
}

fn networks_title(addresses: &[String], strings: &Strings) -> String {
    if addresses.is_empty() {
        return strings.translate("menu.networks_none");
    }
    strings.translate_with("menu.networks", &[&addresses.join(", ")])
}
