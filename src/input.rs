use crate::session::HostEvent;
use std::io::BufRead;
use std::thread;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

pub const HELP: &str = "commands: search <term> | / <term> | clear | refresh | retry | hide | show | offline | online | quit";

pub fn parse_command(line: &str) -> Option<HostEvent> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_lowercase().as_str() {
        "search" | "/" => Some(HostEvent::Search(rest.to_string())),
        "clear" => Some(HostEvent::ClearSearch),
        "refresh" | "r" => Some(HostEvent::Refresh),
        "retry" => Some(HostEvent::Retry),
        "hide" => Some(HostEvent::Hidden),
        "show" => Some(HostEvent::Visible),
        "offline" => Some(HostEvent::Offline),
        "online" => Some(HostEvent::Online),
        "quit" | "q" | "exit" => Some(HostEvent::Unload),
        _ => None,
    }
}

pub fn forward_lines<R: BufRead>(reader: R, lines: UnboundedSender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if lines.send(line).is_err() {
                    trace!("Command listener detached, stopping stdin reader");
                    return;
                }
            }
            Err(e) => {
                warn!("Error reading stdin: {}", e);
                return;
            }
        }
    }

    debug!("stdin closed, no more commands");
}

pub fn spawn_command_listener(
    mut lines: UnboundedReceiver<String>,
    sender: UnboundedSender<HostEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(line) = lines.recv().await {
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Some(event) => {
                    if sender.send(event).is_err() {
                        trace!("Event receiver dropped, stopping command listener");
                        break;
                    }
                }
                None => warn!("Unknown command {:?}, {}", line.trim(), HELP),
            }
        }
    })
}

// A pending stdin read must not hold up runtime shutdown, hence the detached thread.
pub fn spawn_stdin_listener(sender: UnboundedSender<HostEvent>) -> JoinHandle<()> {
    let (line_sender, line_receiver) = mpsc::unbounded_channel();

    let reader = thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || forward_lines(std::io::stdin().lock(), line_sender));
    if let Err(e) = reader {
        warn!("Cannot start stdin reader, commands disabled: {}", e);
    }

    spawn_command_listener(line_receiver, sender)
}

pub fn spawn_signal_listener(sender: UnboundedSender<HostEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        trace!("Waiting for Ctrl+C signal...");
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        info!("Ctrl+C pressed. Stopping...");
        if sender.send(HostEvent::Unload).is_err() {
            warn!("Event receiver is already dropped");
        }
    })
}
