use forgekit::domain::errors::ValidationError;
use forgekit::domain::models::TypeKey;
use forgekit::domain::ports::CommandContext;
use forgekit::services::{ArgumentResolver, CommandScanner};
use forgekit::{ClassCatalog, CommandClass, CommandMeta, MethodDecl, ParamDecl, ResolverRegistry};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::sync::Arc;

struct Sample;
struct Other;

fn scanner() -> CommandScanner {
    CommandScanner::new(Arc::new(ResolverRegistry::with_builtins()))
}

/// `required` text arguments followed by `optional` defaulted integers.
/// `contexts[i]` puts a command-context parameter before the i-th argument;
/// the last entry puts one after all of them.
fn sample_class(name: &str, required: usize, optional: usize, contexts: &[bool]) -> CommandClass {
    let mut method = MethodDecl::new_sync("execute", |_: &Sample, _| Ok(()));
    let context_at = |i: usize| contexts.get(i).copied().unwrap_or(false);
    for i in 0..required + optional {
        if context_at(i) {
            method = method.param(ParamDecl::context::<Arc<dyn CommandContext>>(format!("ctx{i}")));
        }
        method = if i < required {
            method.param(ParamDecl::argument::<String>(format!("req{i}")))
        } else {
            method.param(
                ParamDecl::argument::<i32>(format!("opt{i}"))
                    .optional()
                    .default_value(i.to_string()),
            )
        };
    }
    if context_at(required + optional) {
        method = method.param(ParamDecl::context::<Arc<dyn CommandContext>>("ctx_last"));
    }
    CommandClass::of::<Sample>()
        .command(CommandMeta::new(name))
        .method(method)
}

proptest! {
    /// Property: argument specs keep declaration order and positions, with
    /// context parameters interleaved anywhere
    #[test]
    fn prop_argument_specs_follow_declaration_order(
        (required, optional, contexts) in (0usize..6, 0usize..6).prop_flat_map(|(required, optional)| {
            (
                Just(required),
                Just(optional),
                proptest::collection::vec(any::<bool>(), required + optional + 1),
            )
        }),
    ) {
        let definition = scanner()
            .build_definition(&sample_class("sample", required, optional, &contexts))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let context_count = contexts.iter().filter(|&&c| c).count();
        prop_assert_eq!(definition.parameters().len(), required + optional + context_count);
        for (index, param) in definition.parameters().iter().enumerate() {
            prop_assert_eq!(param.position(), index);
        }

        let arguments: Vec<_> = definition.arguments().collect();
        prop_assert_eq!(arguments.len(), required + optional);
        for (index, (param, arg)) in arguments.iter().enumerate() {
            let contexts_before = contexts[..=index].iter().filter(|&&c| c).count();
            prop_assert_eq!(param.position(), index + contexts_before);
            prop_assert!(!param.is_context());
            prop_assert_eq!(arg.is_optional(), index >= required);
            let prefix = if index < required { "req" } else { "opt" };
            prop_assert_eq!(param.name(), format!("{prefix}{index}"));
        }
    }

    /// Property: a required argument after an optional one is always rejected
    #[test]
    fn prop_required_after_optional_rejected(
        required in 0usize..4,
        optional in 1usize..4,
    ) {
        let class = CommandClass::of::<Sample>()
            .command(CommandMeta::new("sample"))
            .method({
                let mut method = MethodDecl::new_sync("execute", |_: &Sample, _| Ok(()));
                for i in 0..required {
                    method = method.param(ParamDecl::argument::<String>(format!("req{i}")));
                }
                for i in 0..optional {
                    method = method.param(ParamDecl::argument::<bool>(format!("flag{i}")).optional());
                }
                method.param(ParamDecl::argument::<String>("late"))
            });

        match scanner().build_definition(&class) {
            Err(ValidationError::RequiredAfterOptional { parameter, optional, .. }) => {
                prop_assert_eq!(parameter, "late");
                prop_assert_eq!(optional, "flag0");
            }
            other => prop_assert!(false, "expected ordering violation, got {:?}", other.map(|d| d.name().to_string())),
        }
    }

    /// Property: duplicate command names name both declaring classes, in
    /// catalog order
    #[test]
    fn prop_duplicate_names_report_both_classes(name in "[a-z]{1,12}", sample_first in any::<bool>()) {
        let sample = sample_class(&name, 0, 0, &[]);
        let other = CommandClass::of::<Other>()
            .command(CommandMeta::new(name.clone()))
            .method(MethodDecl::new_sync("execute", |_: &Other, _| Ok(())));
        let (catalog, expected_first, expected_second) = if sample_first {
            (
                ClassCatalog::from_classes([sample, other]),
                TypeKey::of::<Sample>().name(),
                TypeKey::of::<Other>().name(),
            )
        } else {
            (
                ClassCatalog::from_classes([other, sample]),
                TypeKey::of::<Other>().name(),
                TypeKey::of::<Sample>().name(),
            )
        };

        match scanner().scan(&catalog, "") {
            Err(ValidationError::DuplicateCommandName { name: duplicate, first, second }) => {
                prop_assert_eq!(duplicate, name);
                prop_assert_eq!(first, expected_first);
                prop_assert_eq!(second, expected_second);
            }
            other => prop_assert!(false, "expected duplicate name, got {:?}", other.map(|d| d.len())),
        }
    }

    /// Property: built-in resolvers parse every well-formed default
    #[test]
    fn prop_builtin_defaults_parse(value in any::<i32>(), flag in any::<bool>(), text in ".*") {
        let registry = ResolverRegistry::with_builtins();

        let integer = registry.get(TypeKey::of::<i32>()).unwrap().parse_default(&value.to_string()).unwrap();
        prop_assert_eq!(integer.downcast_ref::<i32>(), Some(&value));

        let raw = if flag { "TRUE" } else { "false" };
        let boolean = registry.get(TypeKey::of::<bool>()).unwrap().parse_default(raw).unwrap();
        prop_assert_eq!(boolean.downcast_ref::<bool>(), Some(&flag));

        let string = registry.get(TypeKey::of::<String>()).unwrap().parse_default(&text).unwrap();
        prop_assert_eq!(string.downcast_ref::<String>(), Some(&text));
    }
}
