use std::{io::Write, path::Path};

use anyhow::Result;

use crate::{
    cli::{Cli, Command, DEFAULT_WIDTH},
    domain::{self, sort_policy::SortMode},
    infra, ui,
    usecases::{
        self, bootstrap, chat_list::ChatListService, context::AppContext,
        contracts::SettingsGateway,
    },
};

const SNAPSHOT_EVENT_REJECTED: &str = "SNAPSHOT_EVENT_REJECTED";

pub fn run(cli: Cli) -> Result<()> {
    let mut context = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let stdout = std::io::stdout();
    execute(&mut context, cli.command, &mut stdout.lock())
}

fn execute(context: &mut AppContext, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Show {
            snapshot,
            mode,
            width,
        } => {
            let mode = mode
                .map(SortMode::from)
                .unwrap_or(context.config.chat_list.sort_mode);
            let service = load_service(&snapshot, mode)?;
            print_list(&service, width, out)?;
        }
        Command::SortMode {
            mode: None,
            snapshot,
        } => {
            let current = context.settings.load_sort_mode()?;
            writeln!(out, "{current}")?;

            if let Some(path) = snapshot {
                print_list(&load_service(&path, current)?, DEFAULT_WIDTH, out)?;
            }
        }
        Command::SortMode {
            mode: Some(mode),
            snapshot,
        } => {
            let current = context.settings.load_sort_mode()?;
            let mut service = match snapshot.as_deref() {
                Some(path) => load_service(path, current)?,
                None => ChatListService::new(current),
            };

            service.change_sort_mode(&mut context.settings, mode.into())?;
            context.config.chat_list.sort_mode = service.sort_mode();
            writeln!(out, "sort mode set to {}", service.sort_mode())?;

            if snapshot.is_some() {
                print_list(&service, DEFAULT_WIDTH, out)?;
            }
        }
    }

    Ok(())
}

fn load_service(path: &Path, mode: SortMode) -> Result<ChatListService> {
    let snapshot = infra::snapshot::load(path)?;
    let mut service = ChatListService::new(mode);
    service.populate(snapshot.conversations)?;

    for event in snapshot.events {
        let (peer_id, kind) = (event.peer_id(), event.kind());
        if let Err(error) = service.apply(event) {
            tracing::warn!(
                code = SNAPSHOT_EVENT_REJECTED,
                peer_id = %peer_id,
                kind,
                error = %error,
                "snapshot event rejected; continuing replay"
            );
        }
    }

    Ok(service)
}

fn print_list(service: &ChatListService, width: usize, out: &mut dyn Write) -> Result<()> {
    let records = service.records()?;
    for line in ui::list_view::render(&records, service.sort_mode(), width) {
        writeln!(out, "{line}")?;
    }

    Ok(())
}
