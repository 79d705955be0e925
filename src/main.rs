mod theme;

use std::{error::Error, path::PathBuf, process::ExitCode};

use tunnel_menu::{
    MenuHost, MenuItem, StatusMenu, TunnelsManager,
    configuration::{MenuConfiguration, TunnelFile, import_tunnel_file, scan_tunnels},
    script::{parse_script, run_step},
};

use crate::theme::{CHECKMARK, HIDDEN_SUFFIX, NO_CHECKMARK, POSITION_WIDTH, SEPARATOR};

#[derive(Default)]
struct PrintingHost {
    quit_requested: bool,
}

impl MenuHost for PrintingHost {
    fn show_manage_tunnels(&mut self) {
        log::info!("[host] manage tunnels window requested");
    }

    fn import_tunnels(&mut self) {
        log::info!("[host] import requested; pass --import FILE to add a tunnel file");
    }

    fn show_about(&mut self) {
        println!("tunnel-menu v{}", env!("CARGO_PKG_VERSION"));
    }

    fn quit(&mut self) {
        log::info!("[host] quit requested");
        self.quit_requested = true;
    }

    fn show_alert(&mut self, error: &dyn Error) {
        eprintln!("alert: {error}");
    }
}

struct Arguments {
    import: Option<PathBuf>,
    script: Option<PathBuf>,
}

fn parse_arguments() -> Result<Arguments, String> {
    let mut arguments = Arguments {
        import: None,
        script: None,
    };
    let mut iterator = std::env::args().skip(1);
    while let Some(argument) = iterator.next() {
        match argument.as_str() {
            "--import" => {
                let path = iterator
                    .next()
                    .ok_or_else(|| "--import needs a file".to_string())?;
                arguments.import = Some(PathBuf::from(path));
            }
            _ if arguments.script.is_none() => arguments.script = Some(PathBuf::from(argument)),
            _ => return Err(format!("unexpected argument: {argument}")),
        }
    }
    Ok(arguments)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("tunnel_menu=info"),
    )
    .init();

    log::info!(
        "tunnel-menu v{} starting (RUST_LOG={})",
        env!("CARGO_PKG_VERSION"),
        std::env::var("RUST_LOG").unwrap_or_else(|_| "<default: info>".into()),
    );

    let arguments = match parse_arguments() {
        Ok(arguments) => arguments,
        Err(error) => {
            eprintln!("{error}\nusage: tunnel-menu [--import FILE] [SCRIPT]");
            return ExitCode::from(2);
        }
    };

    let configuration = MenuConfiguration::load();
    let tunnels_path = configuration.tunnels_directory();
    log::info!("[startup] tunnels directory: {}", tunnels_path.display());

    if let Some(source) = &arguments.import {
        match import_tunnel_file(source, &tunnels_path) {
            Ok(destination) => log::info!("[startup] imported {}", destination.display()),
            Err(error) => log::warn!("[startup] failed to import tunnel file: {error}"),
        }
    }

    let (mut tunnels, mut events) = TunnelsManager::with_tunnels(
        scan_tunnels(&tunnels_path)
            .into_iter()
            .map(TunnelFile::into_entry),
    );
    let mut menu = StatusMenu::new(
        &tunnels,
        configuration.strings(),
        configuration.row_rendering(),
    );
    let mut host = PrintingHost::default();

    if let Some(path) = &arguments.script {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) => {
                log::error!("[startup] failed to read script {}: {error}", path.display());
                return ExitCode::FAILURE;
            }
        };
        let steps = match parse_script(&content) {
            Ok(steps) => steps,
            Err(error) => {
                log::error!("[startup] {}: {error}", path.display());
                return ExitCode::FAILURE;
            }
        };
        log::info!("[startup] replaying {} steps from {}", steps.len(), path.display());

        for step in &steps {
            if let Err(error) = run_step(step, &mut tunnels, &mut events, &mut menu, &mut host) {
                log::error!("[script] {step:?} failed: {error}");
                return ExitCode::FAILURE;
            }
            if host.quit_requested {
                break;
            }
        }
    }

    print_menu(&menu.items());
    ExitCode::SUCCESS
}

fn print_menu(items: &[MenuItem]) {
    for (position, item) in items.iter().enumerate() {
        let line = match item {
            MenuItem::Status { title } => format!("  {title}"),
            MenuItem::Networks { title, hidden } => {
                format!("  {title}{}", if *hidden { HIDDEN_SUFFIX } else { "" })
            }
            MenuItem::Separator => SEPARATOR.to_string(),
            MenuItem::Tunnel { title, checked, .. } => {
                format!("{} {title}", if *checked { CHECKMARK } else { NO_CHECKMARK })
            }
            MenuItem::Command { title, .. } => format!("  {title}"),
        };
        println!("{position:>POSITION_WIDTH$} {line}");
    }
}
