//! Payload dispatcher: runs payloads by command id
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::commands::context::CommandContext;
use crate::commands::payload::CommandPayload;
use crate::commands::plugin::{ProcessCommand, ProcessorPlugin};
use crate::commands::registry::PluginRegistry;
use crate::core::{Misconfiguration, Scope, StartupError, ValidationError};
use crate::source::MessageSource;

use super::supervisor::TaskStats;
use super::{Dispatch, DispatchLoop, Router};

/// Executes [`CommandPayload`]s coming off the work queue.
///
/// No matching or gating happens here; the payload already names its
/// command.
pub struct Processor {
    source: Arc<dyn MessageSource>,
    plugins: PluginRegistry<dyn ProcessorPlugin>,
    commands: Vec<ProcessCommand>,
    stats: TaskStats,
}

impl Processor {
    pub fn new(source: Arc<dyn MessageSource>) -> Self {
        Self {
            source,
            plugins: PluginRegistry::new(),
            commands: Vec::new(),
            stats: TaskStats::default(),
        }
    }

    pub fn register_plugin(&mut self, plugin: Arc<dyn ProcessorPlugin>) -> bool {
        self.plugins.register(plugin)
    }

    /// Add an engine-level command, scanned after every plugin.
    pub fn register_command(&mut self, command: ProcessCommand) {
        self.commands.push(command);
    }

    pub fn stats(&self) -> TaskStats {
        self.stats.clone()
    }

    pub fn validate(&self) -> Result<(), StartupError> {
        self.collect().map(|_| ())
    }

    pub fn open(
        self,
        inbound: mpsc::Receiver<CommandPayload>,
    ) -> Result<JoinHandle<()>, StartupError> {
        let commands = self.collect()?;
        info!(
            "Processor ready: {} plugin(s), {} command(s)",
            self.plugins.len(),
            commands.len()
        );

        let router = ProcessorRouter {
            context: Arc::new(CommandContext::new(self.source, self.stats.clone())),
            commands: Arc::new(commands),
        };
        Ok(DispatchLoop::new(router, self.stats).spawn(inbound))
    }

    /// Flatten plugins and engine commands into scan order.
    fn collect(&self) -> Result<Vec<ProcessCommand>, StartupError> {
        let mut problems = Vec::new();
        let mut commands = Vec::new();

        let scoped = self
            .plugins
            .iter()
            .map(|plugin| {
                let scope = Scope::Plugin(plugin.name().to_string());
                if plugin.name().is_empty() {
                    problems.push(Misconfiguration::new(
                        scope.clone(),
                        ValidationError::MissingPluginName,
                    ));
                }
                (scope, plugin.commands())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .chain(std::iter::once((Scope::Engine, self.commands.clone())));

        for (scope, batch) in scoped {
            for command in batch {
                match command.validate() {
                    Ok(()) => commands.push(command),
                    Err(errors) => problems.extend(
                        errors
                            .into_iter()
                            .map(|e| Misconfiguration::new(scope.clone(), e)),
                    ),
                }
            }
        }

        if problems.is_empty() {
            Ok(commands)
        } else {
            for problem in &problems {
                error!("Invalid configuration, {problem}");
            }
            Err(StartupError::Misconfigured(problems))
        }
    }
}

struct ProcessorRouter {
    context: Arc<CommandContext>,
    commands: Arc<Vec<ProcessCommand>>,
}

impl Router for ProcessorRouter {
    type Item = CommandPayload;

    fn tier(&self) -> &'static str {
        "processor"
    }

    fn route(&self, payload: CommandPayload) -> Option<Dispatch> {
        let Some(command) = self
            .commands
            .iter()
            .find(|c| c.command_id == payload.command_id)
        else {
            debug!("No processor for command '{}', dropped", payload.command_id);
            return None;
        };

        let handler = command.handler.clone();
        let context = self.context.clone();
        Some(Dispatch::new(
            format!("{} from {}", payload.command_id, payload.message.author_id()),
            Box::pin(async move { handler.process(context, payload).await }),
        ))
    }
}
