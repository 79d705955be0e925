use serde::Deserialize;

use crate::{
    error::{MenuError, ScriptError},
    status_menu::{MenuHost, StatusMenu},
    tunnel::{TunnelKey, TunnelStatus},
    tunnels_manager::{TunnelEvents, TunnelsManager},
};

/// One line of a replay script, e.g.
/// `{"op": "status", "name": "office", "status": "active"}`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Add {
        name: String,
        #[serde(default)]
        addresses: Vec<String>,
    },
    Remove {
        name: String,
    },
    Rename {
        from: String,
        to: String,
    },
    Status {
        name: String,
        status: TunnelStatus,
    },
    Click {
        position: usize,
    },
}

/// Parses JSON lines. Blank lines and lines starting with `#` are skipped.
pub fn parse_script(content: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(number, line)| {
            serde_json::from_str(line).map_err(|source| ScriptError {
                line: number + 1,
                source,
            })
        })
        .collect()
}

/// Applies one step to the tunnels and feeds the resulting events to the
/// menu before returning.
pub fn run_step(
    step: &ScriptStep,
    tunnels: &mut TunnelsManager,
    events: &mut TunnelEvents,
    menu: &mut StatusMenu,
    host: &mut dyn MenuHost,
) -> Result<(), MenuError> {
    log::debug!("[script] {step:?}");
    match step {
        ScriptStep::Add { name, addresses } => {
            tunnels.add(name, addresses.clone())?;
        }
        ScriptStep::Remove { name } => {
            let key = key_named(tunnels, name)?;
            tunnels.remove(key)?;
        }
        ScriptStep::Rename { from, to } => {
            let key = key_named(tunnels, from)?;
            let addresses = tunnels
                .tunnel(key)
                .map(|tunnel| tunnel.addresses().to_vec())
                .unwrap_or_default();
            tunnels.modify(key, to, addresses)?;
        }
        ScriptStep::Status { name, status } => {
            let key = key_named(tunnels, name)?;
            tunnels.set_status(key, *status)?;
        }
        ScriptStep::Click { position } => {
            menu.select(*position, tunnels, host)?;
        }
    }
    let handled = menu.process_events(tunnels, events)?;
    log::trace!("[script] handled {handled} events");
    Ok(())
}

fn key_named(tunnels: &TunnelsManager, name: &str) -> Result<TunnelKey, MenuError> {
    tunnels
        .tunnel_named(name)
        .map(|tunnel| tunnel.key())
        .ok_or_else(|| MenuError::UnknownTunnel(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{menu_item::RowRendering, strings::Strings};

    struct NullHost;

    impl MenuHost for NullHost {
        fn show_manage_tunnels(&mut self) {}
        fn import_tunnels(&mut self) {}
        fn show_about(&mut self) {}
        fn quit(&mut self) {}
        fn show_alert(&mut self, _error: &dyn std::error::Error) {}
    }

    #[test]
    fn parses_json_lines_skipping_comments() {
        let steps = parse_script(
            r#"
# bring up the office tunnel
{"op": "add", "name": "office", "addresses": ["10.0.0.2/32"]}
{"op": "status", "name": "office", "status": "active"}

{"op": "click", "position": 3}
"#,
        )
        .unwrap();

        assert_eq!(
            steps,
            vec![
                ScriptStep::Add {
                    name: "office".into(),
                    addresses: vec!["10.0.0.2/32".into()],
                },
                ScriptStep::Status {
                    name: "office".into(),
                    status: TunnelStatus::Active,
                },
                ScriptStep::Click { position: 3 },
            ]
        );
    }

    #[test]
    fn parse_errors_carry_the_line_number() {
        let error = parse_script("{\"op\": \"add\", \"name\": \"a\"}\n{\"op\": \"explode\"}")
            .unwrap_err();
        assert_eq!(error.line, 2);
    }

    #[test]
    fn steps_drive_tunnels_and_menu_together() {
        let (mut tunnels, mut events) = TunnelsManager::new();
        let mut menu = StatusMenu::new(&tunnels, Strings::default(), RowRendering::default());
        let steps = parse_script(
            r#"{"op": "add", "name": "office", "addresses": ["10.0.0.2/32", "fd00::2/128"]}
{"op": "add", "name": "home"}
{"op": "click", "position": 4}
{"op": "status", "name": "office", "status": "active"}
{"op": "rename", "from": "home", "to": "zoo"}"#,
        )
        .unwrap();

        for step in &steps {
            run_step(step, &mut tunnels, &mut events, &mut menu, &mut NullHost).unwrap();
        }

        let titles: Vec<_> = menu.tunnel_rows().iter().map(|row| row.title()).collect();
        assert_eq!(titles, vec!["office", "zoo"]);
        assert!(menu.tunnel_rows()[0].checked());
        assert_eq!(menu.summary().status_title(), "Status: Inactive");
    }

    #[test]
    fn unknown_tunnel_names_are_reported() {
        let (mut tunnels, mut events) = TunnelsManager::new();
        let mut menu = StatusMenu::new(&tunnels, Strings::default(), RowRendering::default());
        let step = ScriptStep::Remove {
            name: "ghost".into(),
        };

        assert_eq!(
            run_step(&step, &mut tunnels, &mut events, &mut menu, &mut NullHost),
            Err(MenuError::UnknownTunnel("ghost".into()))
        );
    }
}
