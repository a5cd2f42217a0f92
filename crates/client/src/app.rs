//! Interactive arena loop: stdin commands in, participant messages out.
use std::ops::ControlFlow;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

use combat_core::{CombatEvent, SessionId};
use combat_runtime::{
    Event, FileSessionRepository, InMemorySessionRepository, RuntimeConfig, SessionManager,
    SessionRepository, Topic,
};

use crate::config::ArenaConfig;
use crate::roster::{self, ARENA, PLAYER};

const HELP: &str = "Commands: do <action> | pass | quit";

pub struct ArenaApp {
    manager: SessionManager,
}

impl ArenaApp {
    pub fn new(config: &ArenaConfig, runtime: RuntimeConfig) -> Result<Self> {
        let repository: Arc<dyn SessionRepository> = if config.enable_persistence {
            let dir = runtime
                .save_data_dir
                .clone()
                .unwrap_or_else(RuntimeConfig::default_save_dir);
            tracing::info!(target: "arena", dir = %dir.display(), "persisting sessions");
            Arc::new(FileSessionRepository::new(dir)?)
        } else {
            Arc::new(InMemorySessionRepository::new())
        };

        let manager = SessionManager::builder()
            .config(runtime)
            .world(roster::populate(&config.player_name, config.opponents))
            .repository(repository)
            .build();

        Ok(Self { manager })
    }

    pub async fn run(self) -> Result<()> {
        let mut messages = self.manager.event_bus().subscribe(Topic::Message);
        let mut combat = self.manager.event_bus().subscribe(Topic::Combat);

        let resumed = self.manager.resume().await?;
        let handle = match self.manager.session_for(PLAYER).await {
            Some(handle) => {
                tracing::info!(target: "arena", resumed, session = %handle.id(), "resuming fight");
                println!("You are back in the fight.");
                handle
            }
            None => match self.manager.initiate(PLAYER, ARENA).await {
                Ok(handle) => handle,
                Err(error) if error.rejection_reason().is_some() => {
                    println!("{error}");
                    return self.shutdown().await;
                }
                Err(error) => return Err(error.into()),
            },
        };
        let session = handle.id();
        println!("{HELP}");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                message = messages.recv() => {
                    if print_message(message).is_break() {
                        break;
                    }
                }
                event = combat.recv() => {
                    if is_end_of(session, event) {
                        flush(&mut messages);
                        break;
                    }
                }
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if self.handle_input(&line).await.is_break() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }

        self.shutdown().await
    }

    async fn handle_input(&self, line: &str) -> ControlFlow<()> {
        let line = line.trim();
        let text = match line.split_once(' ') {
            _ if line.eq_ignore_ascii_case("quit") => return ControlFlow::Break(()),
            _ if line.eq_ignore_ascii_case("pass") => line,
            Some((command, rest)) if command.eq_ignore_ascii_case("do") => rest,
            _ => {
                println!("{HELP}");
                return ControlFlow::Continue(());
            }
        };

        match self.manager.submit_action(PLAYER, text).await {
            Ok(submission) => {
                tracing::debug!(target: "arena", status = %submission.status, "action accepted");
            }
            Err(error) if error.rejection_reason().is_some() => println!("{error}"),
            Err(error) => {
                tracing::error!(target: "arena", %error, "submission failed");
                println!("Something went wrong; try again.");
            }
        }
        ControlFlow::Continue(())
    }

    async fn shutdown(self) -> Result<()> {
        self.manager.shutdown().await?;
        Ok(())
    }
}

fn print_message(message: Result<Event, RecvError>) -> ControlFlow<()> {
    match message {
        Ok(Event::Message(message)) if message.recipient == PLAYER => println!("{}", message.text),
        Ok(_) => {}
        Err(RecvError::Lagged(skipped)) => {
            tracing::warn!(target: "arena", skipped, "message stream lagged");
        }
        Err(RecvError::Closed) => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

fn is_end_of(session: SessionId, event: Result<Event, RecvError>) -> bool {
    matches!(
        event,
        Ok(Event::Combat(ref e))
            if e.session == session && matches!(e.event, CombatEvent::CombatEnded { .. })
    )
}

/// Print messages published before the session ended.
fn flush(messages: &mut broadcast::Receiver<Event>) {
    while let Ok(message) = messages.try_recv() {
        if let Event::Message(message) = message
            && message.recipient == PLAYER
        {
            println!("{}", message.text);
        }
    }
}
