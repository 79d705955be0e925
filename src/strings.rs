use std::collections::HashMap;

const DEFAULT_STRINGS: &[(&str, &str)] = &[
    ("status.waiting", "Waiting"),
    ("status.inactive", "Inactive"),
    ("status.activating", "Activating"),
    ("status.active", "Active"),
    ("status.deactivating", "Deactivating"),
    ("status.reasserting", "Reactivating"),
    ("status.restarting", "Restarting"),
    ("menu.status", "Status: {}"),
    ("menu.networks", "Networks: {}"),
    ("menu.networks_none", "Networks: None"),
    ("menu.manage_tunnels", "Manage Tunnels"),
    ("menu.import_tunnels", "Import Tunnel(s) from File…"),
    ("menu.about", "About Tunnel Menu"),
    ("menu.quit", "Quit Tunnel Menu"),
];

/// Key to display-string table.
///
/// Unknown keys translate to themselves. `{}` placeholders are filled in
/// order by [`Strings::translate_with`].
#[derive(Clone, Debug)]
pub struct Strings {
    table: HashMap<String, String>,
}

impl Default for Strings {
    fn default() -> Self {
        Self {
            table: DEFAULT_STRINGS
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }
}

impl Strings {
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut strings = Self::default();
        for (key, value) in overrides {
            if !strings.table.contains_key(key) {
                log::warn!("[strings] override for unknown key {key:?}");
            }
            strings.table.insert(key.clone(), value.clone());
        }
        strings
    }

    pub fn translate(&self, key: &str) -> String {
        match self.table.get(key) {
            Some(value) => value.clone(),
            None => {
                log::debug!("[strings] missing translation for {key:?}");
                key.to_string()
            }
        }
    }

    pub fn translate_with(&self, key: &str, arguments: &[&str]) -> String {
        let template = self.translate(key);
        let mut result = String::with_capacity(template.len());
        let mut arguments = arguments.iter();
        let mut rest = template.as_str();
        while let Some(position) = rest.find("{}") {
            result.push_str(&rest[..position]);
            match arguments.next() {
                Some(argument) => result.push_str(argument),
                None => result.push_str("{}"),
            }
            rest = &rest[position + 2..];
        }
        result.push_str(rest);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_filled_in_order() {
        let strings = Strings::default();
        assert_eq!(
            strings.translate_with("menu.networks", &["10.0.0.2/32"]),
            "Networks: 10.0.0.2/32"
        );
    }

    #[test]
    fn missing_arguments_leave_the_placeholder() {
        let strings = Strings::default();
        assert_eq!(strings.translate_with("menu.status", &[]), "Status: {}");
    }

    #[test]
    fn unknown_key_translates_to_itself() {
        assert_eq!(Strings::default().translate("menu.bogus"), "menu.bogus");
    }

    #[test]
    fn overrides_replace_defaults() {
        let overrides = HashMap::from([("status.active".to_string(), "Aktiv".to_string())]);
        let strings = Strings::with_overrides(&overrides);
        assert_eq!(strings.translate("status.active"), "Aktiv");
        assert_eq!(strings.translate("status.inactive"), "Inactive");
    }
}
