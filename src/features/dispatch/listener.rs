//! Local dispatcher: chat messages in, payloads out
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Accept mention-addressed messages that lack the prefix
//! - 1.1.0: Handlers run under the task supervisor
//! - 1.0.0: Prefix filter, trigger scan, access gate, argument extraction

use log::{debug, error, info};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::commands::context::CommandContext;
use crate::commands::definition::CommandDefinition;
use crate::commands::handler::CommandCallback;
use crate::commands::payload::CommandPayload;
use crate::commands::plugin::ListenerPlugin;
use crate::commands::registry::PluginRegistry;
use crate::core::{
    chunk_for_message, ListenerConfig, Misconfiguration, Scope, StartupError, ValidationError,
};
use crate::features::matching::{
    extract_arguments, first_trigger_match, is_commands_request, validate_command_access,
    ArgumentPattern,
};
use crate::source::{Message, MessageRef, MessageSource};

use super::help::{compose_help, render_help, HelpSection};
use super::supervisor::TaskStats;
use super::{Dispatch, DispatchLoop, Router};

/// Turns inbound messages into [`CommandPayload`]s for a [`CommandCallback`].
///
/// Fill the registries, then [`open`](Self::open) it with the receiving end
/// of the message channel.
pub struct Listener {
    config: ListenerConfig,
    source: Arc<dyn MessageSource>,
    callback: Arc<dyn CommandCallback>,
    plugins: PluginRegistry<dyn ListenerPlugin>,
    commands: Vec<CommandDefinition>,
    stats: TaskStats,
}

impl Listener {
    pub fn new(
        config: ListenerConfig,
        source: Arc<dyn MessageSource>,
        callback: Arc<dyn CommandCallback>,
    ) -> Self {
        Self {
            config,
            source,
            callback,
            plugins: PluginRegistry::new(),
            commands: Vec::new(),
            stats: TaskStats::default(),
        }
    }

    /// Returns `true` when a plugin of the same name was replaced.
    pub fn register_plugin(&mut self, plugin: Arc<dyn ListenerPlugin>) -> bool {
        self.plugins.register(plugin)
    }

    /// Add an engine-level command, scanned after every plugin.
    pub fn register_command(&mut self, definition: CommandDefinition) {
        self.commands.push(definition);
    }

    pub fn stats(&self) -> TaskStats {
        self.stats.clone()
    }

    /// Check every plugin and command, logging each problem.
    pub fn validate(&self) -> Result<(), StartupError> {
        self.compile().map(|_| ())
    }

    /// Validate, freeze the registries and start the ingestion loop.
    pub fn open(self, inbound: mpsc::Receiver<MessageRef>) -> Result<JoinHandle<()>, StartupError> {
        let tables = self.compile()?;
        info!(
            "Listener ready: {} plugin(s), {} engine command(s), prefix '{}'",
            tables.plugins.len(),
            tables.engine.len(),
            self.config.command_prefix
        );

        let context = Arc::new(CommandContext::new(self.source.clone(), self.stats.clone()));
        let router = ListenerRouter {
            command_prefix: self.config.command_prefix,
            source: self.source,
            callback: self.callback,
            context,
            tables: Arc::new(tables),
        };
        Ok(DispatchLoop::new(router, self.stats).spawn(inbound))
    }

    /// Read every plugin's commands once and compile their argument patterns.
    fn compile(&self) -> Result<Tables, StartupError> {
        let mut problems = Vec::new();

        let mut plugins = Vec::with_capacity(self.plugins.len());
        for plugin in self.plugins.iter() {
            let scope = Scope::Plugin(plugin.name().to_string());
            if plugin.name().is_empty() {
                problems.push(Misconfiguration::new(
                    scope.clone(),
                    ValidationError::MissingPluginName,
                ));
            }
            let commands = compile_commands(plugin.commands(), &scope, &mut problems);
            plugins.push(CompiledPlugin {
                plugin: plugin.clone(),
                commands,
            });
        }

        let engine = compile_commands(self.commands.clone(), &Scope::Engine, &mut problems);

        if problems.is_empty() {
            Ok(Tables { plugins, engine })
        } else {
            for problem in &problems {
                error!("Invalid configuration, {problem}");
            }
            Err(StartupError::Misconfigured(problems))
        }
    }
}

fn compile_commands(
    definitions: Vec<CommandDefinition>,
    scope: &Scope,
    problems: &mut Vec<Misconfiguration>,
) -> Vec<CompiledCommand> {
    let mut compiled = Vec::with_capacity(definitions.len());
    for definition in definitions {
        if let Err(errors) = definition.validate() {
            problems.extend(
                errors
                    .into_iter()
                    .map(|e| Misconfiguration::new(scope.clone(), e)),
            );
            continue;
        }
        match ArgumentPattern::compile(&definition.arguments) {
            Ok(pattern) => compiled.push(CompiledCommand {
                definition,
                pattern,
            }),
            Err(e) => problems.push(Misconfiguration::new(
                scope.clone(),
                ValidationError::InvalidArgumentPattern {
                    command_id: definition.command_id.clone(),
                    reason: e.to_string(),
                },
            )),
        }
    }
    compiled
}

struct CompiledCommand {
    definition: CommandDefinition,
    pattern: Option<ArgumentPattern>,
}

struct CompiledPlugin {
    plugin: Arc<dyn ListenerPlugin>,
    commands: Vec<CompiledCommand>,
}

/// Frozen registries, shared by the loop and help tasks.
struct Tables {
    plugins: Vec<CompiledPlugin>,
    engine: Vec<CompiledCommand>,
}

impl Tables {
    /// Plugins in registration order, then engine commands.
    fn scan_order(&self) -> impl Iterator<Item = &CompiledCommand> {
        self.plugins
            .iter()
            .flat_map(|p| p.commands.iter())
            .chain(self.engine.iter())
    }

    fn help_lines(&self, command_prefix: &str, message: &dyn Message) -> Vec<String> {
        let mut sections: Vec<HelpSection<'_>> = self
            .plugins
            .iter()
            .map(|p| HelpSection {
                plugin: Some(p.plugin.as_ref()),
                commands: p.commands.iter().map(|c| &c.definition).collect(),
            })
            .collect();
        sections.push(HelpSection {
            plugin: None,
            commands: self.engine.iter().map(|c| &c.definition).collect(),
        });
        compose_help(command_prefix, &sections, message)
    }
}

struct ListenerRouter {
    command_prefix: String,
    source: Arc<dyn MessageSource>,
    callback: Arc<dyn CommandCallback>,
    context: Arc<CommandContext>,
    tables: Arc<Tables>,
}

impl ListenerRouter {
    fn accepts(&self, message: &dyn Message) -> bool {
        let raw = message.raw_text();
        if raw.trim().is_empty() {
            return false;
        }
        if !raw.starts_with(&self.command_prefix) && !message.mentions_bot() {
            return false;
        }
        !self.source.is_me(message)
    }

    /// First command whose trigger fires and whose access gate passes.
    ///
    /// Scanning stops at that command even when its arguments do not parse.
    fn select(
        &self,
        message: &dyn Message,
    ) -> Option<(&CompiledCommand, String, HashMap<String, String>)> {
        let raw = message.raw_text();
        let parts: Vec<&str> = raw.split_whitespace().collect();

        for command in self.tables.scan_order() {
            let definition = &command.definition;
            let Some((trigger, matched)) =
                first_trigger_match(definition, &self.command_prefix, &parts, message)
            else {
                continue;
            };

            if !validate_command_access(self.source.as_ref(), definition, message) {
                debug!(
                    "Access to '{}' denied for {}",
                    definition.command_id,
                    message.author_id()
                );
                continue;
            }

            return match extract_arguments(raw, &matched, command.pattern.as_ref()) {
                Some(arguments) => Some((command, trigger, arguments)),
                None => {
                    debug!(
                        "Arguments for '{}' did not match: {raw}",
                        definition.command_id
                    );
                    None
                }
            };
        }
        None
    }

    fn help_dispatch(&self, message: MessageRef) -> Dispatch {
        let tables = self.tables.clone();
        let context = self.context.clone();
        let command_prefix = self.command_prefix.clone();

        Dispatch::new(
            format!("commands for {}", message.author_id()),
            Box::pin(async move {
                let lines = tables.help_lines(&command_prefix, message.as_ref());
                for chunk in chunk_for_message(&render_help(&lines)) {
                    context
                        .source
                        .send_message(message.channel_id(), &chunk)
                        .await?;
                }
                Ok(())
            }),
        )
    }
}

impl Router for ListenerRouter {
    type Item = MessageRef;

    fn tier(&self) -> &'static str {
        "listener"
    }

    fn route(&self, message: MessageRef) -> Option<Dispatch> {
        if !self.accepts(message.as_ref()) {
            return None;
        }

        if is_commands_request(&self.command_prefix, message.as_ref()) {
            return Some(self.help_dispatch(message));
        }

        let (command, trigger, arguments) = self.select(message.as_ref())?;
        let command_id = command.definition.command_id.clone();
        let request_id = Uuid::new_v4();
        info!(
            "[{request_id}] <{}> {}: {}",
            message.channel_id(),
            message.author_name(),
            message.raw_text()
        );

        let payload = CommandPayload::new(command_id.clone(), trigger, arguments, message);
        let callback = self.callback.clone();
        let context = self.context.clone();
        Some(Dispatch::new(
            format!("{command_id} [{request_id}]"),
            Box::pin(async move { callback.on_command(context, payload).await }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::definition::{CommandArgument, ExposureLevel, PermissionLevel};
    use crate::commands::registry::NamedPlugin;
    use crate::testing::{FakeMessage, FakeSource, BOT_ID, OWNER_ID};
    use std::time::Duration;

    struct TestPlugin {
        name: &'static str,
        commands: Vec<CommandDefinition>,
    }

    impl NamedPlugin for TestPlugin {
        fn name(&self) -> &str {
            self.name
        }
    }

    impl ListenerPlugin for TestPlugin {
        fn commands(&self) -> Vec<CommandDefinition> {
            self.commands.clone()
        }
    }

    fn plugin(name: &'static str, commands: Vec<CommandDefinition>) -> Arc<dyn ListenerPlugin> {
        Arc::new(TestPlugin { name, commands })
    }

    /// Forwards every payload to a channel the test can read.
    fn capture() -> (Arc<dyn CommandCallback>, mpsc::UnboundedReceiver<(String, CommandPayload)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback = move |_ctx: Arc<CommandContext>, payload: CommandPayload| {
            let tx = tx.clone();
            async move {
                let _ = tx.send((payload.command_id.clone(), payload));
                Ok::<(), anyhow::Error>(())
            }
        };
        let callback: Arc<dyn CommandCallback> = Arc::new(callback);
        (callback, rx)
    }

    fn listener(source: Arc<FakeSource>, callback: Arc<dyn CommandCallback>) -> Listener {
        Listener::new(ListenerConfig::default(), source, callback)
    }

    /// Feed `messages`, close the channel and collect every dispatched payload.
    async fn run(
        listener: Listener,
        mut payloads: mpsc::UnboundedReceiver<(String, CommandPayload)>,
        messages: Vec<FakeMessage>,
    ) -> Vec<(String, CommandPayload)> {
        let (tx, rx) = mpsc::channel(16);
        let handle = listener.open(rx).unwrap();
        for message in messages {
            tx.send(message.arc()).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        let mut received = Vec::new();
        while let Ok(Some(item)) =
            tokio::time::timeout(Duration::from_millis(100), payloads.recv()).await
        {
            received.push(item);
        }
        received
    }

    fn ping(id: &str) -> CommandDefinition {
        CommandDefinition::new(id).trigger("ping").description("Pong")
    }

    #[tokio::test]
    async fn test_prefix_exact_trigger() {
        let (callback, payloads) = capture();
        let mut listener = listener(Arc::new(FakeSource::new()), callback);
        listener.register_command(CommandDefinition::new("foo").trigger("foo"));

        let received = run(
            listener,
            payloads,
            vec![
                FakeMessage::public("!foobar", "u1"),
                FakeMessage::public("foo", "u1"),
                FakeMessage::public("!foo bar", "u1"),
            ],
        )
        .await;

        assert_eq!(received.len(), 1);
        assert_eq!(received[0].1.trigger, "foo");
        assert_eq!(received[0].1.message.raw_text(), "!foo bar");
    }

    #[tokio::test]
    async fn test_first_match_wins_across_plugins() {
        let (callback, payloads) = capture();
        let mut listener = listener(Arc::new(FakeSource::new()), callback);
        listener.register_plugin(plugin("first", vec![ping("first.ping")]));
        listener.register_plugin(plugin("second", vec![ping("second.ping")]));
        listener.register_command(ping("engine.ping"));

        let received = run(listener, payloads, vec![FakeMessage::public("!ping", "u1")]).await;

        let ids: Vec<&str> = received.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["first.ping"]);
    }

    #[tokio::test]
    async fn test_replaced_plugin_keeps_its_slot() {
        let (callback, payloads) = capture();
        let mut listener = listener(Arc::new(FakeSource::new()), callback);
        listener.register_plugin(plugin("a", vec![ping("a.old")]));
        listener.register_plugin(plugin("b", vec![ping("b.ping")]));
        assert!(listener.register_plugin(plugin("a", vec![ping("a.new")])));

        let received = run(listener, payloads, vec![FakeMessage::public("!ping", "u1")]).await;
        assert_eq!(received[0].0, "a.new");
    }

    #[tokio::test]
    async fn test_private_only_not_dispatched_in_public() {
        let (callback, payloads) = capture();
        let mut listener = listener(Arc::new(FakeSource::new()), callback);
        listener.register_command(
            CommandDefinition::new("secret")
                .trigger("secret")
                .exposure(ExposureLevel::PrivateOnly),
        );

        let received = run(
            listener,
            payloads,
            vec![
                FakeMessage::public("!secret", OWNER_ID),
                FakeMessage::direct("!secret", "u1"),
            ],
        )
        .await;

        assert_eq!(received.len(), 1);
        assert_eq!(received[0].1.message.guild_id(), None);
    }

    #[tokio::test]
    async fn test_denied_command_falls_through_to_next() {
        let (callback, payloads) = capture();
        let mut listener = listener(Arc::new(FakeSource::new()), callback);
        listener.register_plugin(plugin(
            "mod",
            vec![ping("mod.ping").permission(PermissionLevel::Moderator)],
        ));
        listener.register_command(ping("engine.ping"));

        let received = run(
            listener,
            payloads,
            vec![
                FakeMessage::public("!ping", "u1"),
                FakeMessage::public("!ping", OWNER_ID),
            ],
        )
        .await;

        let mut ids: Vec<&str> = received.iter().map(|(id, _)| id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["engine.ping", "mod.ping"]);
    }

    #[tokio::test]
    async fn test_failed_extraction_stops_scan() {
        let (callback, payloads) = capture();
        let mut listener = listener(Arc::new(FakeSource::new()), callback);
        listener.register_plugin(plugin(
            "dice",
            vec![CommandDefinition::new("roll")
                .trigger("roll")
                .argument(CommandArgument::required("n", r"\d+"))],
        ));
        // would accept anything, but must not be reached
        listener.register_command(CommandDefinition::new("fallback").trigger("roll"));

        let received = run(
            listener,
            payloads,
            vec![
                FakeMessage::public("!roll abc", "u1"),
                FakeMessage::public("!roll 6", "u1"),
            ],
        )
        .await;

        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0, "roll");
        assert_eq!(received[0].1.argument("n"), Some("6"));
    }

    #[tokio::test]
    async fn test_mention_invocation_without_prefix() {
        let (callback, payloads) = capture();
        let mut listener = listener(Arc::new(FakeSource::new()), callback);
        listener.register_command(
            CommandDefinition::new("greet")
                .trigger("greet")
                .argument(CommandArgument::required("name", r"\w+")),
        );

        let received = run(
            listener,
            payloads,
            vec![FakeMessage::public("<@!999> greet Alice", "u1")],
        )
        .await;

        assert_eq!(received.len(), 1);
        assert_eq!(received[0].1.argument("name"), Some("Alice"));
    }

    #[tokio::test]
    async fn test_own_and_empty_messages_ignored() {
        let (callback, payloads) = capture();
        let mut listener = listener(Arc::new(FakeSource::new()), callback);
        listener.register_command(ping("ping"));

        let received = run(
            listener,
            payloads,
            vec![
                FakeMessage::public("!ping", BOT_ID),
                FakeMessage::public("", "u1"),
                FakeMessage::public("   ", "u1"),
            ],
        )
        .await;

        assert!(received.is_empty());
    }

    #[test]
    fn test_open_refuses_invalid_definition() {
        let (callback, _payloads) = capture();
        let mut listener = listener(Arc::new(FakeSource::new()), callback);
        listener.register_plugin(plugin("", vec![CommandDefinition::new("x").trigger("x")]));
        listener.register_command(CommandDefinition::new("no-triggers"));

        let err = listener.validate().unwrap_err();
        assert_eq!(
            err.problems(),
            &[
                Misconfiguration::new(
                    Scope::Plugin(String::new()),
                    ValidationError::MissingPluginName
                ),
                Misconfiguration::new(
                    Scope::Engine,
                    ValidationError::MissingTriggers {
                        command_id: "no-triggers".into()
                    }
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_open_fails_without_starting_loop() {
        let (callback, _payloads) = capture();
        let mut listener = listener(Arc::new(FakeSource::new()), callback);
        listener.register_command(
            CommandDefinition::new("bad")
                .trigger("bad")
                .argument(CommandArgument::required("x", "(")),
        );

        let (_tx, rx) = mpsc::channel(1);
        assert!(matches!(
            listener.open(rx),
            Err(StartupError::Misconfigured(problems)) if problems.len() == 1
        ));
    }

    #[tokio::test]
    async fn test_commands_mention_lists_sorted_union() {
        let source = Arc::new(FakeSource::new());
        let (callback, payloads) = capture();
        let mut listener = listener(source.clone(), callback);
        listener.register_plugin(plugin(
            "tools",
            vec![
                CommandDefinition::new("zap").trigger("zap").description("Zap it"),
                CommandDefinition::new("hidden").trigger("hidden").unlisted(),
            ],
        ));
        listener.register_command(ping("ping"));

        let received = run(
            listener,
            payloads,
            vec![FakeMessage::public("<@999> commands", "u1")],
        )
        .await;
        assert!(received.is_empty());

        let sent = source.wait_for_replies(1).await;
        assert_eq!(
            sent,
            vec![(
                "general".to_string(),
                "`!ping` - Pong\n`!zap` - Zap it".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_commands_with_empty_registry() {
        let source = Arc::new(FakeSource::new());
        let (callback, payloads) = capture();
        let listener = listener(source.clone(), callback);

        run(listener, payloads, vec![FakeMessage::public("!commands", "u1")]).await;

        let sent = source.wait_for_replies(1).await;
        assert_eq!(sent[0].1, "No commands found");
    }

    #[tokio::test]
    async fn test_failing_callback_does_not_stop_loop() {
        let source = Arc::new(FakeSource::new());
        let callback = |_ctx: Arc<CommandContext>, payload: CommandPayload| async move {
            if payload.command_id == "boom" {
                anyhow::bail!("handler failed");
            }
            Ok::<(), anyhow::Error>(())
        };
        let mut listener = listener(source, Arc::new(callback));
        listener.register_command(CommandDefinition::new("boom").trigger("boom"));
        listener.register_command(ping("ping"));
        let stats = listener.stats();

        let (tx, rx) = mpsc::channel(4);
        let handle = listener.open(rx).unwrap();
        tx.send(FakeMessage::public("!boom", "u1").arc()).await.unwrap();
        tx.send(FakeMessage::public("!ping", "u1").arc()).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        for _ in 0..100 {
            if stats.in_flight() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(stats.spawned(), 2);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.completed(), 1);
    }
}
