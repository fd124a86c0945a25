//! End-to-end scenarios: declaration, scan, registration and dispatch
//! through the in-memory host.

mod common;

use std::sync::{Arc, Mutex};

use forgekit::domain::errors::{FrameworkError, ValidationError};
use forgekit::domain::models::ParameterKind;
use forgekit::domain::ports::{CommandContext, EntityRef};
use forgekit::services::CommandScanner;
use forgekit::{
    ClassCatalog, CommandCategory, CommandClass, CommandMeta, MethodDecl, ParamDecl,
    ResolverRegistry, Sender,
};

const FAILURE: &str = "An error occurred while executing this command.";

#[derive(Default)]
struct Calls {
    seen: Mutex<Vec<String>>,
}

impl Calls {
    fn record(&self, entry: impl Into<String>) {
        self.seen.lock().unwrap().push(entry.into());
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.seen.lock().unwrap())
    }
}

struct Status {
    calls: Arc<Calls>,
}

fn status_class() -> CommandClass {
    CommandClass::of::<Status>()
        .command(CommandMeta::new("status").description("Show status"))
        .method(
            MethodDecl::new("execute", |cmd: Arc<Status>, args| async move {
                assert_eq!(args.len(), 1);
                let ctx = args.command_context(0)?;
                cmd.calls.record(ctx.sender_name());
                Ok::<_, anyhow::Error>(())
            })
            .param(ParamDecl::context::<Arc<dyn CommandContext>>("ctx")),
        )
}

#[test]
fn scenario_a_background_command_receives_only_its_context() {
    let host = common::host_with_players();
    let calls = Arc::new(Calls::default());
    let shared = Arc::clone(&calls);
    let app = common::application(&host, [status_class()], move |container| {
        container
            .register_singleton(move |_| {
                Ok(Status {
                    calls: Arc::clone(&shared),
                })
            })
            .unwrap();
    });

    let report = app.start().unwrap();
    assert_eq!(report.by_category(CommandCategory::Background), vec!["status"]);

    assert!(host.dispatch(&Sender::Console, "status").unwrap().is_empty());
    assert!(host.dispatch(&Sender::player("alex"), "/status").unwrap().is_empty());
    assert_eq!(calls.take(), vec!["CONSOLE", "alex"]);
}

struct Give {
    calls: Arc<Calls>,
}

fn give_class() -> CommandClass {
    CommandClass::of::<Give>()
        .command(CommandMeta::new("give"))
        .method(
            MethodDecl::new_sync("execute", |cmd: &Give, args| {
                let name = args.get::<String>(0)?;
                let amount = args.get::<i32>(1)?;
                cmd.calls.record(format!("{name}:{amount}"));
                Ok(())
            })
            .param(ParamDecl::argument::<String>("name"))
            .param(
                ParamDecl::argument::<i32>("amount")
                    .optional()
                    .default_value("20"),
            )
            .param(ParamDecl::context::<Arc<dyn CommandContext>>("ctx")),
        )
}

#[test]
fn scenario_b_omitted_argument_uses_parsed_default() {
    let definitions = CommandScanner::new(Arc::new(ResolverRegistry::with_builtins()))
        .scan(&ClassCatalog::from_classes([give_class()]), "")
        .unwrap();
    let arguments: Vec<_> = definitions[0]
        .arguments()
        .map(|(param, arg)| (param.position(), arg.name.clone(), arg.default_value.clone()))
        .collect();
    assert_eq!(
        arguments,
        vec![
            (0, "name".to_string(), None),
            (1, "amount".to_string(), Some("20".to_string())),
        ]
    );
    assert!(matches!(
        definitions[0].parameters()[2].kind(),
        ParameterKind::Context
    ));

    let host = common::host_with_players();
    let calls = Arc::new(Calls::default());
    let shared = Arc::clone(&calls);
    let app = common::application(&host, [give_class()], move |container| {
        container
            .register_singleton(move |_| {
                Ok(Give {
                    calls: Arc::clone(&shared),
                })
            })
            .unwrap();
    });
    app.start().unwrap();

    host.dispatch(&Sender::Console, "give steve").unwrap();
    host.dispatch(&Sender::Console, "give steve --amount 3").unwrap();
    assert_eq!(calls.take(), vec!["steve:20", "steve:3"]);
}

struct Look;

#[test]
fn scenario_c_disallowed_context_type_lists_allowed_types() {
    let host = common::host_with_players();
    let class = CommandClass::of::<Look>()
        .command(CommandMeta::new("look").category(CommandCategory::Player))
        .method(
            MethodDecl::new_sync("execute", |_: &Look, _| Ok(()))
                .param(ParamDecl::context::<Vec<EntityRef>>("targets")),
        );
    let app = common::application(&host, [class], |container| {
        container.register_singleton(|_| Ok(Look)).unwrap();
    });

    match app.start() {
        Err(FrameworkError::Validation(ValidationError::UnsupportedContextType {
            command,
            parameter,
            category,
            allowed,
            ..
        })) => {
            assert_eq!(command, "look");
            assert_eq!(parameter, "targets");
            assert_eq!(category, "player");
            assert_eq!(allowed, CommandCategory::Player.allowed_type_names());
            assert!(allowed.contains("PlayerRef"));
            assert!(allowed.contains("EntityStore"));
        }
        other => panic!("expected unsupported context type, got {:?}", other.map(|r| r.total())),
    }
    assert!(host.command_names().is_empty());
}

struct Explode;

#[test]
fn scenario_d_failing_handler_sends_one_failure_message() {
    let host = common::host_with_players();
    let classes = [
        CommandClass::of::<Explode>()
            .command(CommandMeta::new("explode").category(CommandCategory::Player))
            .method(
                MethodDecl::new_sync("execute", |_: &Explode, _| anyhow::bail!("boom"))
                    .param(ParamDecl::context::<Arc<dyn CommandContext>>("ctx")),
            ),
        CommandClass::of::<Calls>()
            .command(CommandMeta::new("panic"))
            .method(MethodDecl::new("execute", |_: Arc<Calls>, _| async {
                if true {
                    panic!("handler bug");
                }
                Ok::<_, anyhow::Error>(())
            })),
    ];
    let app = common::application(&host, classes, |container| {
        container.register_singleton(|_| Ok(Explode)).unwrap();
        container.register_default::<Calls>().unwrap();
    });
    app.start().unwrap();

    assert_eq!(
        host.dispatch(&Sender::player("steve"), "explode").unwrap(),
        vec![FAILURE]
    );
    assert_eq!(host.dispatch(&Sender::Console, "panic").unwrap(), vec![FAILURE]);
}
