use langlive::{Culture, CultureRegistry, ParameterStore, TranslationMap, TranslationUnit, template};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn plain_text_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 _\\-\\.,!\\?]{0,40}").expect("valid text regex")
}

fn name_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,7}").expect("valid name regex")
}

fn value_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9]{1,12}").expect("valid value regex")
}

fn unit_for(template: &str) -> (CultureRegistry, TranslationUnit) {
    let registry = CultureRegistry::new(Culture::parse("en-US").expect("valid culture"));
    let unit = TranslationUnit::with_registry(
        "prop",
        TranslationMap::from_tags([("en", template)]),
        &registry,
    )
    .expect("en template resolves");
    (registry, unit)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_parameterless_template_is_untouched(
        text in plain_text_strategy(),
        indexed in proptest::collection::vec(value_strategy(), 0..4),
        named in proptest::collection::btree_map(name_strategy(), value_strategy(), 0..4),
    ) {
        let (_registry, unit) = unit_for(&text);
        for (index, value) in indexed.iter().enumerate() {
            unit.parameters().set_indexed(index, value.as_str());
        }
        for (name, value) in &named {
            unit.parameters().set_named(name.as_str(), value.as_str());
        }
        prop_assert_eq!(unit.value(), text);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_named_template_resolves_only_when_complete(
        names in proptest::collection::btree_set(name_strategy(), 1..4),
        provided in proptest::collection::vec(any::<bool>(), 4),
        value in value_strategy(),
    ) {
        let template: String = names.iter().map(|name| format!("<{{{name}}}>")).collect();
        let (_registry, unit) = unit_for(&template);

        let mut supplied = BTreeSet::new();
        for (name, give) in names.iter().zip(provided.iter()) {
            if *give {
                unit.parameters().set_named(name.as_str(), value.as_str());
                supplied.insert(name.clone());
            }
        }

        if supplied == names {
            let expected: String = names.iter().map(|_| format!("<{value}>")).collect();
            prop_assert_eq!(unit.value(), expected);
        } else {
            prop_assert_eq!(unit.value(), template);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_repeated_set_emits_once(
        index in 0usize..8,
        value in value_strategy(),
        repeats in 1usize..5,
    ) {
        let store = ParameterStore::new();
        let events = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = events.clone();
        let _subscription = store.subscribe(move |_| counter.set(counter.get() + 1));

        for _ in 0..repeats {
            store.set_indexed(index, value.as_str());
        }
        prop_assert_eq!(events.get(), 1);
        prop_assert_eq!(store.indexed_count(), 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_escaped_index_is_literal(index in 0usize..100, text in plain_text_strategy()) {
        let template = format!("{text}{{{{{index}}}}}");
        prop_assert!(!template::has_placeholders(&template));
        prop_assert_eq!(
            template::resolve_indexed(&template, &[]).expect("no placeholders to fill"),
            format!("{text}{{{index}}}")
        );
    }
}
